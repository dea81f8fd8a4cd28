//! Sources for the request metadata injected into every message.
//!
//! The resolver asks an [`Environment`] for a fixed set of well-known keys
//! and copies any usable value into the message context, unless the caller
//! already supplied that key.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::value::ContextValue;

/// Well-known environment keys consulted on every log call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnvKey {
    ScriptPath,
    QueryString,
    PathInfo,
    ServerAddr,
    ServerName,
    ServerProtocol,
    RequestMethod,
    RequestUri,
    HostHeader,
    ConnectionHeader,
    RemoteUser,
    RemoteAddr,
    RemotePort,
    SessionId,
}

impl EnvKey {
    /// Every key in injection order.
    pub const ALL: [EnvKey; 14] = [
        Self::ScriptPath,
        Self::QueryString,
        Self::PathInfo,
        Self::ServerAddr,
        Self::ServerName,
        Self::ServerProtocol,
        Self::RequestMethod,
        Self::RequestUri,
        Self::HostHeader,
        Self::ConnectionHeader,
        Self::RemoteUser,
        Self::RemoteAddr,
        Self::RemotePort,
        Self::SessionId,
    ];

    /// Context key the value is stored under before flattening.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::ScriptPath => "script",
            Self::QueryString => "http_query",
            Self::PathInfo => "http_path",
            Self::ServerAddr => "http_addr",
            Self::ServerName => "http_vhost",
            Self::ServerProtocol => "http_proto",
            Self::RequestMethod => "http_method",
            Self::RequestUri => "http_uri",
            Self::HostHeader => "http_host",
            Self::ConnectionHeader => "http_connection",
            Self::RemoteUser => "http_user",
            Self::RemoteAddr => "client_addr",
            Self::RemotePort => "client_port",
            Self::SessionId => "session_id",
        }
    }

    /// CGI meta-variable carrying the value, if the key has one.
    pub fn cgi_variable(self) -> Option<&'static str> {
        match self {
            Self::ScriptPath => Some("SCRIPT_FILENAME"),
            Self::QueryString => Some("QUERY_STRING"),
            Self::PathInfo => Some("PATH_INFO"),
            Self::ServerAddr => Some("SERVER_ADDR"),
            Self::ServerName => Some("SERVER_NAME"),
            Self::ServerProtocol => Some("SERVER_PROTOCOL"),
            Self::RequestMethod => Some("REQUEST_METHOD"),
            Self::RequestUri => Some("REQUEST_URI"),
            Self::HostHeader => Some("HTTP_HOST"),
            Self::ConnectionHeader => Some("HTTP_CONNECTION"),
            Self::RemoteUser => Some("REMOTE_USER"),
            Self::RemoteAddr => Some("REMOTE_ADDR"),
            Self::RemotePort => Some("REMOTE_PORT"),
            Self::SessionId => None,
        }
    }
}

/// Read-only key/value source for default message fields.
pub trait Environment: Send + Sync {
    /// Value for `key`, or `None` when unavailable.
    fn lookup(&self, key: EnvKey) -> Option<ContextValue>;

    /// Time the current request or process started, when known.
    fn request_start(&self) -> Option<DateTime<Utc>>;
}

/// CGI meta-variable carrying the request start as fractional seconds.
pub const REQUEST_TIME_VARIABLE: &str = "REQUEST_TIME_FLOAT";

/// Environment backed by CGI-style process variables.
///
/// The script path falls back to the running executable and the request
/// start falls back to the moment the environment was created.
#[derive(Clone, Debug)]
pub struct CgiEnvironment {
    started: DateTime<Utc>,
    session_id: Option<ContextValue>,
}

impl Default for CgiEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl CgiEnvironment {
    pub fn new() -> Self {
        let started = std::env::var(REQUEST_TIME_VARIABLE)
            .ok()
            .and_then(|raw| parse_epoch_seconds(&raw))
            .unwrap_or_else(Utc::now);
        Self {
            started,
            session_id: None,
        }
    }

    /// Attach a session identifier, which may be deferred.
    pub fn with_session_id(mut self, session_id: impl Into<ContextValue>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

impl Environment for CgiEnvironment {
    fn lookup(&self, key: EnvKey) -> Option<ContextValue> {
        if key == EnvKey::SessionId {
            return self.session_id.clone();
        }
        let from_var = key
            .cgi_variable()
            .and_then(|name| std::env::var(name).ok())
            .map(ContextValue::Str);
        match (key, from_var) {
            (EnvKey::ScriptPath, None) => std::env::current_exe()
                .ok()
                .map(|path| ContextValue::Str(path.display().to_string())),
            (_, value) => value,
        }
    }

    fn request_start(&self) -> Option<DateTime<Utc>> {
        Some(self.started)
    }
}

/// Environment populated explicitly, for servers that track request
/// metadata themselves.
#[derive(Clone, Debug, Default)]
pub struct StaticEnvironment {
    values: HashMap<EnvKey, ContextValue>,
    request_start: Option<DateTime<Utc>>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value reported for `key`.
    pub fn with(mut self, key: EnvKey, value: impl Into<ContextValue>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// Set the request start time.
    pub fn with_request_start(mut self, started: DateTime<Utc>) -> Self {
        self.request_start = Some(started);
        self
    }
}

impl Environment for StaticEnvironment {
    fn lookup(&self, key: EnvKey) -> Option<ContextValue> {
        self.values.get(&key).cloned()
    }

    fn request_start(&self) -> Option<DateTime<Utc>> {
        self.request_start
    }
}

fn parse_epoch_seconds(raw: &str) -> Option<DateTime<Utc>> {
    let seconds: f64 = raw.trim().parse().ok()?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round() as i64;
    Utc.timestamp_micros(micros).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn every_key_has_a_distinct_field_name() {
        let mut names: Vec<_> = EnvKey::ALL.iter().map(|k| k.field_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EnvKey::ALL.len());
    }

    #[rstest]
    #[case(EnvKey::ScriptPath, "script")]
    #[case(EnvKey::ServerName, "http_vhost")]
    #[case(EnvKey::RemotePort, "client_port")]
    #[case(EnvKey::SessionId, "session_id")]
    fn field_names_are_stable(#[case] key: EnvKey, #[case] name: &str) {
        assert_eq!(key.field_name(), name);
    }

    #[rstest]
    #[case("1700000000.25", Some(1_700_000_000_250_000))]
    #[case(" 12.5 ", Some(12_500_000))]
    #[case("0", None)]
    #[case("soon", None)]
    fn parses_request_time(#[case] raw: &str, #[case] micros: Option<i64>) {
        assert_eq!(
            parse_epoch_seconds(raw).map(|t| t.timestamp_micros()),
            micros
        );
    }

    #[rstest]
    fn cgi_environment_mirrors_process_variables() {
        let env = CgiEnvironment::new().with_session_id("s-9");
        assert_eq!(
            env.lookup(EnvKey::RequestMethod)
                .and_then(|v| v.scalar_string()),
            std::env::var("REQUEST_METHOD").ok()
        );
        assert!(env.lookup(EnvKey::ScriptPath).is_some());
        assert!(matches!(env.lookup(EnvKey::SessionId), Some(ContextValue::Str(ref s)) if s == "s-9"));
        assert!(env.request_start().is_some());
    }

    #[rstest]
    fn static_environment_reports_configured_values() {
        let env = StaticEnvironment::new()
            .with(EnvKey::RemotePort, 4711)
            .with(EnvKey::SessionId, "s-1");
        assert!(matches!(env.lookup(EnvKey::RemotePort), Some(ContextValue::Int(4711))));
        assert!(env.lookup(EnvKey::RemoteAddr).is_none());
        assert!(env.request_start().is_none());
    }
}
