//! Fixtures pairing a bound collector socket with a client pointed at it.

#![allow(dead_code)]

use gelf_socket::test_utils::DatagramCollector;
use gelf_socket::{GelfSocket, GelfSocketBuilder, StaticEnvironment};
use rstest::fixture;

/// Host name stamped on every message sent by fixture clients.
pub const TEST_HOST: &str = "test-host";

#[fixture]
pub fn collector() -> DatagramCollector {
    DatagramCollector::bind().expect("bind collector socket")
}

/// Client sending to `collector` with request metadata disabled.
pub fn client_for(collector: &DatagramCollector) -> GelfSocket {
    let mut client = GelfSocketBuilder::new()
        .with_endpoint(collector.path())
        .with_hostname(TEST_HOST)
        .build()
        .expect("valid client configuration");
    client.set_environment(StaticEnvironment::new());
    client
}
