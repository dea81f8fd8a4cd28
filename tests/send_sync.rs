//! Send/Sync guarantees for core types.

use gelf_socket::test_utils::ScriptedTransport;
use gelf_socket::{
    CgiEnvironment, Context, ContextValue, GelfLogAdapter, GelfSocket, GelfSocketBuilder,
    GelfSocketConfig, SharedGelfSocket, ShutdownHooks, StaticEnvironment, UnixDatagramTransport,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn configuration_is_send_sync() {
    assert_impl_all!(GelfSocketBuilder: Send, Sync);
    assert_impl_all!(GelfSocketConfig: Send, Sync);
    assert_impl_all!(Context: Send, Sync);
    assert_impl_all!(ContextValue: Send, Sync);
}

#[rstest]
fn clients_can_move_between_threads() {
    assert_impl_all!(GelfSocket: Send);
    assert_impl_all!(GelfSocket<ScriptedTransport>: Send);
    assert_impl_all!(SharedGelfSocket: Send, Sync);
    assert_impl_all!(SharedGelfSocket<ScriptedTransport>: Send, Sync);
    assert_impl_all!(GelfLogAdapter<UnixDatagramTransport>: Send, Sync);
    assert_impl_all!(ShutdownHooks: Send, Sync);
}

#[rstest]
fn environments_are_send_sync() {
    assert_impl_all!(CgiEnvironment: Send, Sync);
    assert_impl_all!(StaticEnvironment: Send, Sync);
}
