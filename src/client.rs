//! The GELF client: resolve, encode, queue, and deliver log calls.

use std::fmt;

use crate::builder::GelfSocketBuilder;
use crate::config::GelfSocketConfig;
use crate::defaults::DefaultsRegistry;
use crate::envelope::Envelope;
use crate::environment::{CgiEnvironment, Environment};
use crate::error::GelfError;
use crate::hostname::system_hostname;
use crate::level::{GelfLevel, LevelArg};
use crate::macros::level_methods;
use crate::resolver::Resolver;
use crate::socket::{ConnectionState, Outbound, Transport, UnixDatagramTransport, encode_with_limit};
use crate::value::{Context, ContextValue};

/// Client shipping GELF messages over a datagram transport.
///
/// Every [`log`](Self::log) call is encoded immediately and appended to an
/// outbound queue. With autoflush enabled (the default) the queue is drained
/// straight away; otherwise messages wait for an explicit
/// [`flush`](Self::flush). The connection is opened lazily on the first
/// flush and re-opened after a send failure.
///
/// ```no_run
/// use gelf_socket::{GelfSocket, context};
///
/// let mut gelf = GelfSocket::builder()
///     .with_endpoint("/var/run/gelf.sock")
///     .build()?;
/// gelf.set_default("service", "billing");
/// gelf.info("invoice sent", context! { "invoice" => 42 })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct GelfSocket<T: Transport = UnixDatagramTransport> {
    hostname: String,
    default_level: GelfLevel,
    autoflush: bool,
    quiet_shutdown: bool,
    max_message_size: usize,
    defaults: DefaultsRegistry,
    environment: Box<dyn Environment>,
    outbound: Outbound<T>,
}

impl GelfSocket {
    /// Client for the default endpoint with default settings.
    pub fn new() -> Self {
        Self::with_config(GelfSocketConfig::default())
    }

    /// Client sending to `config.endpoint`.
    pub fn with_config(config: GelfSocketConfig) -> Self {
        let transport = UnixDatagramTransport::new(config.endpoint.clone());
        Self::with_transport(transport, config)
    }

    pub fn builder() -> GelfSocketBuilder {
        GelfSocketBuilder::new()
    }
}

impl Default for GelfSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> GelfSocket<T> {
    /// Client over an arbitrary transport. `config.endpoint` is not used.
    pub fn with_transport(transport: T, config: GelfSocketConfig) -> Self {
        let hostname = config.hostname.unwrap_or_else(system_hostname);
        Self {
            hostname,
            default_level: config.default_level,
            autoflush: config.autoflush,
            quiet_shutdown: config.quiet_shutdown,
            max_message_size: config.max_message_size,
            defaults: DefaultsRegistry::new(),
            environment: Box::new(CgiEnvironment::new()),
            outbound: Outbound::new(transport, config.warn_interval),
        }
    }

    /// Record one event.
    ///
    /// Encoding and size errors are returned. Transport errors from the
    /// automatic flush are logged instead, and the message stays queued.
    pub fn log<'l>(
        &mut self,
        level: impl Into<LevelArg<'l>>,
        message: &str,
        context: Context,
    ) -> Result<&mut Self, GelfError> {
        let envelope = self.prepare(level, message, context);
        let payload = encode_with_limit(&envelope, self.max_message_size)?;
        self.outbound.enqueue(payload);
        if self.autoflush
            && let Err(err) = self.outbound.flush(false)
        {
            self.outbound.report(&err);
        }
        Ok(self)
    }

    level_methods!(
        emergency => Emergency,
        alert => Alert,
        critical => Critical,
        error => Error,
        warning => Warning,
        notice => Notice,
        info => Info,
        debug => Debug,
        trace => Trace,
    );

    /// Build the envelope a `log` call would send, without queueing it.
    pub fn prepare<'l>(
        &self,
        level: impl Into<LevelArg<'l>>,
        message: &str,
        context: Context,
    ) -> Envelope {
        self.resolver().prepare(level, message, context)
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver {
            hostname: &self.hostname,
            default_level: self.default_level,
            defaults: &self.defaults,
            environment: self.environment.as_ref(),
        }
    }

    /// Deliver queued messages.
    ///
    /// With `quiet` set, transport errors are logged rather than returned.
    pub fn flush(&mut self, quiet: bool) -> Result<&mut Self, GelfError> {
        self.outbound.flush(quiet)?;
        Ok(self)
    }

    /// Release the connection. Queued messages are kept.
    pub fn close(&mut self) -> &mut Self {
        self.outbound.close();
        self
    }

    /// Register or replace a default field.
    ///
    /// Deferred values from [`ContextValue::deferred`] run on every call.
    pub fn set_default(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> &mut Self {
        self.defaults.set(key, value);
        self
    }

    pub fn defaults(&self) -> &DefaultsRegistry {
        &self.defaults
    }

    pub fn enable_autoflush(&mut self) -> &mut Self {
        self.autoflush = true;
        self
    }

    pub fn disable_autoflush(&mut self) -> &mut Self {
        self.autoflush = false;
        self
    }

    pub fn autoflush(&self) -> bool {
        self.autoflush
    }

    pub fn set_hostname(&mut self, hostname: impl Into<String>) -> &mut Self {
        self.hostname = hostname.into();
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn set_default_level(&mut self, level: GelfLevel) -> &mut Self {
        self.default_level = level;
        self
    }

    pub fn default_level(&self) -> GelfLevel {
        self.default_level
    }

    pub fn set_quiet_shutdown(&mut self, quiet: bool) -> &mut Self {
        self.quiet_shutdown = quiet;
        self
    }

    pub fn quiet_shutdown(&self) -> bool {
        self.quiet_shutdown
    }

    /// Replace the source of request metadata.
    pub fn set_environment(&mut self, environment: impl Environment + 'static) -> &mut Self {
        self.environment = Box::new(environment);
        self
    }

    /// Number of messages waiting for delivery.
    pub fn pending(&self) -> usize {
        self.outbound.pending()
    }

    pub fn state(&self) -> ConnectionState {
        self.outbound.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn transport(&self) -> &T {
        self.outbound.transport()
    }
}

impl<T: Transport> Drop for GelfSocket<T> {
    fn drop(&mut self) {
        self.outbound.close();
    }
}

impl<T: Transport> fmt::Debug for GelfSocket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GelfSocket")
            .field("endpoint", &self.outbound.transport().describe())
            .field("hostname", &self.hostname)
            .field("default_level", &self.default_level)
            .field("autoflush", &self.autoflush)
            .field("pending", &self.outbound.pending())
            .field("state", &self.outbound.state())
            .finish()
    }
}
