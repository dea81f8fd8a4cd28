//! GELF client shipping structured log messages over a local Unix datagram
//! socket.
//!
//! A log call is flattened into GELF additional fields, merged with
//! client-wide defaults and request metadata, encoded as JSON, and queued.
//! The queue is drained over a lazily opened connection either after every
//! call (autoflush) or on an explicit [`GelfSocket::flush`].

mod macros;

pub mod builder;
pub mod client;
pub mod config;
pub mod defaults;
pub mod envelope;
pub mod environment;
pub mod error;
pub mod file_config;
pub mod flatten;
pub mod hostname;
pub mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
pub mod rate_limited_warner;
pub mod resolver;
pub mod shutdown;
pub mod socket;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;
pub mod value;

pub use builder::{BuildError, GelfSocketBuilder};
pub use client::GelfSocket;
pub use config::{DEFAULT_ENDPOINT, GelfSocketConfig};
pub use defaults::DefaultsRegistry;
pub use envelope::{Envelope, GELF_VERSION};
pub use environment::{CgiEnvironment, EnvKey, Environment, StaticEnvironment};
pub use error::GelfError;
pub use file_config::ConfigFileError;
pub use flatten::{AdditionalFields, flatten};
pub use level::{DEFAULT_LEVEL, GelfLevel, LevelArg, UnknownLevel};
#[cfg(feature = "log-compat")]
pub use log_compat::{GelfLogAdapter, install};
pub use log_record::LogRecord;
pub use resolver::Resolver;
pub use shutdown::{SharedGelfSocket, ShutdownHooks};
pub use socket::{
    Connection, ConnectionState, MAX_MESSAGE_SIZE, Transport, UnixDatagramTransport, encode,
};
pub use value::{Context, ContextValue, Deferred};
