//! Compatibility bridge for the Rust `log` crate.
//!
//! [`GelfLogAdapter`] implements `log::Log` and forwards each record to a
//! shared [`GelfSocket`]. Records carry their target, module path, file, and
//! line as additional fields. Records emitted by this crate are ignored so
//! delivery diagnostics never loop back into the queue.
//!
//! Other threads wait for the client lock. A record raised on a thread that
//! is already inside the adapter is dropped.

use std::cell::Cell;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::client::GelfSocket;
use crate::context;
use crate::level::GelfLevel;
use crate::shutdown::SharedGelfSocket;
use crate::socket::{Transport, UnixDatagramTransport};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

impl From<log::Level> for GelfLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => GelfLevel::Error,
            log::Level::Warn => GelfLevel::Warning,
            log::Level::Info => GelfLevel::Info,
            log::Level::Debug => GelfLevel::Debug,
            log::Level::Trace => GelfLevel::Trace,
        }
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

thread_local! {
    static IN_ADAPTER: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside the adapter until dropped.
struct ReentryGuard;

impl ReentryGuard {
    fn enter() -> Option<Self> {
        (!IN_ADAPTER.with(|flag| flag.replace(true))).then_some(Self)
    }
}

impl Drop for ReentryGuard {
    fn drop(&mut self) {
        IN_ADAPTER.with(|flag| flag.set(false));
    }
}

/// Adapter implementing the Rust `log::Log` trait.
pub struct GelfLogAdapter<T: Transport = UnixDatagramTransport> {
    client: SharedGelfSocket<T>,
    filter: LevelFilter,
}

impl<T: Transport> GelfLogAdapter<T> {
    pub fn new(client: SharedGelfSocket<T>, filter: LevelFilter) -> Self {
        Self { client, filter }
    }

    pub fn client(&self) -> &SharedGelfSocket<T> {
        &self.client
    }
}

impl<T> log::Log for GelfLogAdapter<T>
where
    T: Transport,
    GelfSocket<T>: Send,
{
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter && !is_own_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(_guard) = ReentryGuard::enter() else {
            return;
        };
        let mut client = self.client.lock();
        let context = context! {
            "logger" => record.target(),
            "module" => record.module_path(),
            "file" => record.file(),
            "line" => record.line(),
        };
        let message = record.args().to_string();
        if let Err(err) = client.log(GelfLevel::from(record.level()), &message, context) {
            eprintln!("gelf_socket: failed to ship log record: {err}");
        }
    }

    fn flush(&self) {
        let Some(_guard) = ReentryGuard::enter() else {
            return;
        };
        let _ = self.client.lock().flush(true);
    }
}

/// Install `client` as the global `log` backend.
///
/// Fails when another global logger is already set.
pub fn install<T>(client: SharedGelfSocket<T>, filter: LevelFilter) -> Result<(), SetLoggerError>
where
    T: Transport + 'static,
    GelfSocket<T>: Send,
{
    log::set_boxed_logger(Box::new(GelfLogAdapter::new(client, filter)))?;
    log::set_max_level(filter);
    Ok(())
}
