//! Validating builder for [`GelfSocket`].

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::client::GelfSocket;
use crate::config::GelfSocketConfig;
use crate::level::GelfLevel;
use crate::socket::{MAX_MESSAGE_SIZE, Transport, UnixDatagramTransport};

/// Errors raised while validating builder input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(BuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for [`GelfSocket`] clients.
///
/// Unset options fall back to [`GelfSocketConfig::default`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GelfSocketBuilder {
    endpoint: Option<PathBuf>,
    hostname: Option<String>,
    default_level: Option<GelfLevel>,
    autoflush: Option<bool>,
    quiet_shutdown: Option<bool>,
    max_message_size: Option<usize>,
    warn_interval_ms: Option<u64>,
}

impl GelfSocketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collector socket path.
    pub fn with_endpoint(mut self, endpoint: impl Into<PathBuf>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Override the detected host name.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    option_setter!(
        #[doc = "Level used when a call's level cannot be resolved."]
        with_default_level,
        default_level,
        GelfLevel
    );
    option_setter!(with_autoflush, autoflush, bool);
    option_setter!(with_quiet_shutdown, quiet_shutdown, bool);
    option_setter!(
        #[doc = "Reject encoded messages longer than this many bytes."]
        with_max_message_size,
        max_message_size,
        usize
    );
    option_setter!(with_warn_interval_ms, warn_interval_ms, u64);

    fn validate(&self) -> Result<(), BuildError> {
        if self
            .endpoint
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(BuildError::InvalidConfig("endpoint must not be empty".into()));
        }
        if self
            .hostname
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(BuildError::InvalidConfig("hostname must not be empty".into()));
        }
        if let Some(size) = self.max_message_size {
            ensure_positive!(size, "max_message_size")?;
            if size > MAX_MESSAGE_SIZE {
                return Err(BuildError::InvalidConfig(format!(
                    "max_message_size must not exceed {MAX_MESSAGE_SIZE}"
                )));
            }
        }
        if let Some(interval) = self.warn_interval_ms {
            ensure_positive!(interval, "warn_interval_ms")?;
        }
        Ok(())
    }

    /// Validate the options and produce a configuration.
    pub fn build_config(&self) -> Result<GelfSocketConfig, BuildError> {
        self.validate()?;
        let mut config = GelfSocketConfig::default();
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ref hostname) = self.hostname {
            config.hostname = Some(hostname.clone());
        }
        if let Some(level) = self.default_level {
            config.default_level = level;
        }
        if let Some(autoflush) = self.autoflush {
            config.autoflush = autoflush;
        }
        if let Some(quiet) = self.quiet_shutdown {
            config.quiet_shutdown = quiet;
        }
        if let Some(size) = self.max_message_size {
            config.max_message_size = size;
        }
        if let Some(ms) = self.warn_interval_ms {
            config.warn_interval = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// Build a client sending to the configured Unix socket path.
    pub fn build(&self) -> Result<GelfSocket, BuildError> {
        let config = self.build_config()?;
        let transport = UnixDatagramTransport::new(config.endpoint.clone());
        Ok(GelfSocket::with_transport(transport, config))
    }

    /// Build a client over a caller-supplied transport.
    ///
    /// The configured endpoint is ignored.
    pub fn build_with_transport<T: Transport>(
        &self,
        transport: T,
    ) -> Result<GelfSocket<T>, BuildError> {
        let config = self.build_config()?;
        Ok(GelfSocket::with_transport(transport, config))
    }
}
