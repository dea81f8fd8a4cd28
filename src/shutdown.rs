//! Explicit flush-on-exit registration.
//!
//! Nothing here runs on its own. The embedding runtime owns a
//! [`ShutdownHooks`] value and calls [`ShutdownHooks::run`] when the process
//! is about to exit, for example after the main loop returns or from a
//! signal handler thread.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::GelfSocket;
use crate::socket::{Transport, UnixDatagramTransport};

/// Client shared between threads, the shutdown registry, and the `log`
/// bridge.
pub type SharedGelfSocket<T = UnixDatagramTransport> = Arc<Mutex<GelfSocket<T>>>;

type Hook = Box<dyn FnOnce() + Send>;

/// Ordered list of callbacks run once at shutdown.
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Mutex<Vec<Hook>>,
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary callback.
    pub fn defer(&self, hook: impl FnOnce() + Send + 'static) {
        self.hooks.lock().push(Box::new(hook));
    }

    /// Flush `client` at shutdown using its `quiet_shutdown` setting.
    ///
    /// Only a weak reference is held; a client dropped earlier is skipped.
    pub fn register_shutdown<T>(&self, client: &SharedGelfSocket<T>)
    where
        T: Transport + 'static,
        GelfSocket<T>: Send,
    {
        let weak = Arc::downgrade(client);
        self.defer(move || {
            let Some(client) = weak.upgrade() else {
                return;
            };
            let mut client = client.lock();
            let quiet = client.quiet_shutdown();
            if let Err(err) = client.flush(quiet) {
                log::warn!("GELF shutdown flush failed: {err}");
            }
        });
    }

    /// Run and discard every registered hook in registration order.
    ///
    /// Returns the number of hooks run. Hooks registered while running are
    /// kept for the next call.
    pub fn run(&self) -> usize {
        let hooks = std::mem::take(&mut *self.hooks.lock());
        let count = hooks.len();
        for hook in hooks {
            hook();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.hooks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.lock().is_empty()
    }
}

impl fmt::Debug for ShutdownHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHooks")
            .field("pending", &self.len())
            .finish()
    }
}

impl<T: Transport> GelfSocket<T> {
    /// Wrap the client for sharing.
    pub fn into_shared(self) -> SharedGelfSocket<T> {
        Arc::new(Mutex::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GelfSocketConfig;
    use crate::test_utils::ScriptedTransport;
    use crate::value::Context;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn shared(transport: &ScriptedTransport) -> SharedGelfSocket<ScriptedTransport> {
        let config = GelfSocketConfig {
            autoflush: false,
            ..GelfSocketConfig::default().with_hostname("h")
        };
        GelfSocket::with_transport(transport.clone(), config).into_shared()
    }

    #[rstest]
    fn registered_client_is_flushed_on_run() {
        let transport = ScriptedTransport::new();
        let client = shared(&transport);
        client.lock().info("pending", Context::new()).expect("queued");
        let hooks = ShutdownHooks::new();
        hooks.register_shutdown(&client);
        assert_eq!(hooks.len(), 1);
        assert!(transport.delivered().is_empty());

        assert_eq!(hooks.run(), 1);
        assert_eq!(transport.delivered().len(), 1);
        assert!(hooks.is_empty());
        assert_eq!(hooks.run(), 0);
    }

    #[rstest]
    fn dropped_clients_are_skipped() {
        let transport = ScriptedTransport::new();
        let client = shared(&transport);
        let hooks = ShutdownHooks::new();
        hooks.register_shutdown(&client);
        drop(client);
        assert_eq!(hooks.run(), 1);
        assert_eq!(transport.connects(), 0);
    }

    #[rstest]
    fn quiet_shutdown_swallows_connect_failures() {
        let transport = ScriptedTransport::new();
        transport.fail_next_connects(1);
        let client = shared(&transport);
        {
            let mut guard = client.lock();
            guard.set_quiet_shutdown(true);
            guard.info("m", Context::new()).expect("queued");
        }
        let hooks = ShutdownHooks::new();
        hooks.register_shutdown(&client);
        hooks.run();
        assert_eq!(client.lock().pending(), 1);
    }

    #[rstest]
    fn deferred_hooks_run_in_order() {
        let hooks = ShutdownHooks::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let order = Arc::clone(&order);
            hooks.defer(move || order.lock().push(id));
        }
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        hooks.defer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hooks.run(), 4);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
