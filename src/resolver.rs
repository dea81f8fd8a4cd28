//! Turn `(level, message, context)` triples into GELF envelopes.

use chrono::{DateTime, Utc};

use crate::defaults::DefaultsRegistry;
use crate::envelope::Envelope;
use crate::environment::{EnvKey, Environment};
use crate::flatten::flatten;
use crate::level::{GelfLevel, LevelArg};
use crate::log_record::LogRecord;
use crate::value::{Context, ContextValue};

/// Context key holding the seconds elapsed since the request started.
pub const TIME_OFFSET_FIELD: &str = "time_offset";

/// Borrowed view of the client settings needed to build an envelope.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    pub hostname: &'a str,
    pub default_level: GelfLevel,
    pub defaults: &'a DefaultsRegistry,
    pub environment: &'a dyn Environment,
}

impl<'a> Resolver<'a> {
    /// Build an envelope stamped with the current time.
    pub fn prepare<'l>(
        &self,
        level: impl Into<LevelArg<'l>>,
        message: &str,
        context: Context,
    ) -> Envelope {
        self.prepare_at(level, message, context, Utc::now())
    }

    /// Build an envelope as of `now`.
    pub fn prepare_at<'l>(
        &self,
        level: impl Into<LevelArg<'l>>,
        message: &str,
        context: Context,
        now: DateTime<Utc>,
    ) -> Envelope {
        let level = level.into().resolve(self.default_level);
        let record = LogRecord::at(level, message, self.defaults.apply(context), now);
        self.resolve(record)
    }

    /// Inject environment defaults into `record` and flatten it.
    pub fn resolve(&self, mut record: LogRecord) -> Envelope {
        inject_environment(&mut record.context, self.environment, record.timestamp);
        Envelope {
            host: self.hostname.to_owned(),
            timestamp: record.timestamp,
            level: record.level,
            message: record.message,
            full_message: record.full_message,
            additional: flatten(&record.context),
        }
    }
}

fn inject_environment(context: &mut Context, environment: &dyn Environment, now: DateTime<Utc>) {
    if context.is_vacant(TIME_OFFSET_FIELD) {
        context.insert(
            TIME_OFFSET_FIELD,
            format_offset(environment.request_start(), now),
        );
    }
    for key in EnvKey::ALL {
        let field = key.field_name();
        if !context.is_vacant(field) {
            continue;
        }
        if let Some(value) = environment
            .lookup(key)
            .map(ContextValue::resolve)
            .filter(is_usable_scalar)
        {
            context.insert(field, value);
        }
    }
}

fn is_usable_scalar(value: &ContextValue) -> bool {
    value.scalar_string().is_some_and(|s| !s.is_empty())
}

/// Seconds between `started` and `now` with six decimals.
///
/// Unknown or future start times yield `0.000000`.
pub fn format_offset(started: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let offset = started
        .filter(|start| *start < now)
        .and_then(|start| (now - start).num_microseconds())
        .map_or(0.0, |micros| micros as f64 / 1_000_000.0);
    format!("{offset:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::environment::StaticEnvironment;
    use chrono::Duration;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        defaults: DefaultsRegistry,
        environment: StaticEnvironment,
    }

    impl Fixture {
        fn resolver(&self) -> Resolver<'_> {
            Resolver {
                hostname: "web-1",
                default_level: GelfLevel::Notice,
                defaults: &self.defaults,
                environment: &self.environment,
            }
        }
    }

    #[fixture]
    fn setup() -> Fixture {
        Fixture {
            defaults: DefaultsRegistry::new(),
            environment: StaticEnvironment::new(),
        }
    }

    #[rstest]
    fn fixed_fields_are_always_present(setup: Fixture) {
        let envelope = setup.resolver().prepare("info", "Hej!", Context::new());
        assert_eq!(envelope.host, "web-1");
        assert_eq!(envelope.level, GelfLevel::Info);
        assert_eq!(envelope.message, "Hej!");
        assert!(envelope.full_message.is_none());
        assert_eq!(
            envelope.additional.get("_time_offset").map(String::as_str),
            Some("0.000000")
        );
    }

    #[rstest]
    #[case(LevelArg::Name("verbose"))]
    #[case(LevelArg::Absent)]
    #[case(LevelArg::Code(42))]
    fn unresolved_levels_use_default(setup: Fixture, #[case] level: LevelArg<'static>) {
        let envelope = setup.resolver().prepare(level, "x", Context::new());
        assert_eq!(envelope.level.code(), 6);
    }

    #[rstest]
    fn multi_line_messages_are_split(setup: Fixture) {
        let envelope = setup.resolver().prepare("info", "1\n2\n3\n4", Context::new());
        assert_eq!(envelope.message, "1");
        assert_eq!(envelope.full_message.as_deref(), Some("2\n3\n4"));
    }

    #[rstest]
    fn environment_fills_only_vacant_keys() {
        let defaults = DefaultsRegistry::new();
        let environment = StaticEnvironment::new()
            .with(EnvKey::RequestMethod, "GET")
            .with(EnvKey::RemoteAddr, "10.0.0.1")
            .with(EnvKey::RemotePort, 55_000)
            .with(EnvKey::QueryString, "")
            .with(EnvKey::ServerName, context! { "nested" => "no" });
        let resolver = Resolver {
            hostname: "h",
            default_level: GelfLevel::Notice,
            defaults: &defaults,
            environment: &environment,
        };
        let envelope = resolver.prepare(
            GelfLevel::Info,
            "m",
            context! { "client_addr" => "192.168.1.9" },
        );
        let field = |name: &str| envelope.additional.get(name).map(String::as_str);
        assert_eq!(field("_http_method"), Some("GET"));
        assert_eq!(field("_client_addr"), Some("192.168.1.9"));
        assert_eq!(field("_client_port"), Some("55000"));
        assert_eq!(field("_http_query"), None);
        assert_eq!(field("_http_vhost"), None);
    }

    #[rstest]
    fn time_offset_measures_from_request_start() {
        let now = Utc::now();
        let defaults = DefaultsRegistry::new();
        let environment =
            StaticEnvironment::new().with_request_start(now - Duration::milliseconds(1500));
        let resolver = Resolver {
            hostname: "h",
            default_level: GelfLevel::Notice,
            defaults: &defaults,
            environment: &environment,
        };
        let envelope = resolver.prepare_at(GelfLevel::Info, "m", Context::new(), now);
        assert_eq!(
            envelope.additional.get("_time_offset").map(String::as_str),
            Some("1.500000")
        );
    }

    #[rstest]
    fn future_request_start_yields_zero_offset() {
        let now = Utc::now();
        assert_eq!(
            format_offset(Some(now + Duration::seconds(5)), now),
            "0.000000"
        );
        assert_eq!(format_offset(Some(now), now), "0.000000");
    }

    #[rstest]
    fn deferred_defaults_run_once_per_prepare(mut setup: Fixture) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        setup.defaults.set(
            "function",
            ContextValue::deferred(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                "test"
            }),
        );
        let resolver = setup.resolver();
        let first = resolver.prepare("info", "a", Context::new());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        resolver.prepare("info", "b", Context::new());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.additional.get("_function").map(String::as_str), Some("test"));
    }

    #[rstest]
    fn caller_values_beat_defaults_and_environment(mut setup: Fixture) {
        setup.defaults.set("time_offset", "custom");
        let envelope = setup.resolver().prepare("info", "m", Context::new());
        assert_eq!(
            envelope.additional.get("_time_offset").map(String::as_str),
            Some("custom")
        );
    }
}
