//! Syslog-style severity levels used by GELF.
//!
//! Lower codes are more severe. Level names are matched case-sensitively and
//! several aliases collapse onto the same code.

use std::fmt;
use std::str::FromStr;

/// GELF severity level, encoded on the wire as an integer between 1 and 9.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum GelfLevel {
    Emergency = 1,
    Alert = 2,
    Critical = 3,
    Error = 4,
    Warning = 5,
    Notice = 6,
    Info = 7,
    Debug = 8,
    Trace = 9,
}

/// Level applied when a call names no level or an unknown one.
pub const DEFAULT_LEVEL: GelfLevel = GelfLevel::Notice;

impl Default for GelfLevel {
    fn default() -> Self {
        DEFAULT_LEVEL
    }
}

impl GelfLevel {
    /// Every level in ascending code order.
    pub const ALL: [GelfLevel; 9] = [
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Numeric code written to the `level` field.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a numeric code back to a level.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse `name`, falling back to `default` for unknown names.
    pub fn parse_or(name: &str, default: GelfLevel) -> Self {
        name.parse().unwrap_or(default)
    }
}

impl fmt::Display for GelfLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not in the level table.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown GELF level name {0:?}")]
pub struct UnknownLevel(pub String);

impl FromStr for GelfLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fatal" | "emerg" | "emergency" => Ok(Self::Emergency),
            "alert" => Ok(Self::Alert),
            "crit" | "critical" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warning),
            "note" | "notice" => Ok(Self::Notice),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" | "core" => Ok(Self::Trace),
            other => Err(UnknownLevel(other.to_owned())),
        }
    }
}

/// Level argument accepted by the logging entry points.
///
/// Callers may pass a resolved [`GelfLevel`], a raw numeric code, a level
/// name, or nothing at all. Anything that does not resolve falls back to the
/// client's default level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelArg<'a> {
    Level(GelfLevel),
    Code(u8),
    Name(&'a str),
    Absent,
}

impl LevelArg<'_> {
    /// Resolve against the level table, using `default` when unresolved.
    pub fn resolve(self, default: GelfLevel) -> GelfLevel {
        match self {
            LevelArg::Level(level) => level,
            LevelArg::Code(code) => GelfLevel::from_code(code).unwrap_or(default),
            LevelArg::Name(name) => GelfLevel::parse_or(name, default),
            LevelArg::Absent => default,
        }
    }
}

impl From<GelfLevel> for LevelArg<'_> {
    fn from(level: GelfLevel) -> Self {
        LevelArg::Level(level)
    }
}

impl From<u8> for LevelArg<'_> {
    fn from(code: u8) -> Self {
        LevelArg::Code(code)
    }
}

impl<'a> From<&'a str> for LevelArg<'a> {
    fn from(name: &'a str) -> Self {
        LevelArg::Name(name)
    }
}

impl<'a> From<&'a String> for LevelArg<'a> {
    fn from(name: &'a String) -> Self {
        LevelArg::Name(name.as_str())
    }
}

impl<'a, T> From<Option<T>> for LevelArg<'a>
where
    T: Into<LevelArg<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(LevelArg::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fatal", 1)]
    #[case("emerg", 1)]
    #[case("emergency", 1)]
    #[case("alert", 2)]
    #[case("crit", 3)]
    #[case("critical", 3)]
    #[case("error", 4)]
    #[case("warn", 5)]
    #[case("warning", 5)]
    #[case("note", 6)]
    #[case("notice", 6)]
    #[case("info", 7)]
    #[case("debug", 8)]
    #[case("trace", 9)]
    #[case("core", 9)]
    fn level_table_maps_aliases(#[case] name: &str, #[case] code: u8) {
        let level: GelfLevel = name.parse().expect("known level name");
        assert_eq!(level.code(), code);
    }

    #[rstest]
    #[case("INFO")]
    #[case("Warning")]
    #[case("verbose")]
    #[case("")]
    fn lookup_is_case_sensitive(#[case] name: &str) {
        assert!(name.parse::<GelfLevel>().is_err());
        assert_eq!(
            LevelArg::from(name).resolve(GelfLevel::Notice),
            GelfLevel::Notice
        );
    }

    #[rstest]
    fn codes_outside_range_fall_back() {
        assert_eq!(LevelArg::Code(0).resolve(GelfLevel::Alert), GelfLevel::Alert);
        assert_eq!(LevelArg::Code(10).resolve(GelfLevel::Alert), GelfLevel::Alert);
        assert_eq!(LevelArg::Code(9).resolve(GelfLevel::Alert), GelfLevel::Trace);
    }

    #[rstest]
    fn absent_level_uses_default() {
        let none: Option<&str> = None;
        assert_eq!(LevelArg::from(none).resolve(DEFAULT_LEVEL).code(), 6);
    }

    #[rstest]
    fn codes_round_trip_through_from_code() {
        for level in GelfLevel::ALL {
            assert_eq!(GelfLevel::from_code(level.code()), Some(level));
            assert_eq!(level.as_str().parse::<GelfLevel>(), Ok(level));
        }
    }
}
