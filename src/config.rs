//! Client configuration and its defaults.
//!
//! [`GelfSocketBuilder`](crate::GelfSocketBuilder) validates user input
//! before producing a [`GelfSocketConfig`]; the client reads it once at
//! construction.

use std::path::PathBuf;
use std::time::Duration;

use crate::level::{DEFAULT_LEVEL, GelfLevel};
use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;
use crate::socket::MAX_MESSAGE_SIZE;

/// Default collector socket path.
pub const DEFAULT_ENDPOINT: &str = "/var/run/gelf.sock";

/// Settings consumed by [`GelfSocket`](crate::GelfSocket).
#[derive(Clone, Debug, PartialEq)]
pub struct GelfSocketConfig {
    /// Path of the collector's datagram socket.
    pub endpoint: PathBuf,
    /// Explicit host name; `None` detects the system host name.
    pub hostname: Option<String>,
    pub default_level: GelfLevel,
    /// Flush after every log call.
    pub autoflush: bool,
    /// Suppress errors from the shutdown flush.
    pub quiet_shutdown: bool,
    pub max_message_size: usize,
    /// Minimum time between repeated delivery failure warnings.
    pub warn_interval: Duration,
}

impl Default for GelfSocketConfig {
    fn default() -> Self {
        Self {
            endpoint: PathBuf::from(DEFAULT_ENDPOINT),
            hostname: None,
            default_level: DEFAULT_LEVEL,
            autoflush: true,
            quiet_shutdown: false,
            max_message_size: MAX_MESSAGE_SIZE,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

impl GelfSocketConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<PathBuf>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }
}
