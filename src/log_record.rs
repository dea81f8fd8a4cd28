//! Per-call log record.
//!
//! A `LogRecord` captures the resolved level, the split message and the
//! caller context at the moment of the log call. It lives only until the
//! resolver turns it into an [`Envelope`](crate::Envelope).

use std::fmt;

use chrono::{DateTime, Utc};

use crate::level::GelfLevel;
use crate::value::Context;

#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Resolved severity.
    pub level: GelfLevel,
    /// First line of the message, trimmed.
    pub message: String,
    /// Remaining lines, trimmed, when the message spans several lines.
    pub full_message: Option<String>,
    /// Caller-supplied context.
    pub context: Context,
    /// Time the record was created.
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Construct a record stamped with the current time.
    pub fn new(level: GelfLevel, message: &str, context: Context) -> Self {
        Self::at(level, message, context, Utc::now())
    }

    /// Construct a record with an explicit creation time.
    pub fn at(level: GelfLevel, message: &str, context: Context, timestamp: DateTime<Utc>) -> Self {
        let (message, full_message) = split_message(message);
        Self {
            level,
            message,
            full_message,
            context,
            timestamp,
        }
    }
}

/// Split a message at its first newline.
///
/// Single-line messages are returned untouched. Otherwise both halves are
/// trimmed and a non-empty tail becomes the full message.
pub fn split_message(message: &str) -> (String, Option<String>) {
    match message.split_once('\n') {
        Some((short, long)) => {
            let long = long.trim();
            (short.trim().to_owned(), (!long.is_empty()).then(|| long.to_owned()))
        }
        None => (message.to_owned(), None),
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hej!", "Hej!", None)]
    #[case("  padded  ", "  padded  ", None)]
    #[case("1\n2\n3\n4", "1", Some("2\n3\n4"))]
    #[case(" head \r\n  tail\n", "head", Some("tail"))]
    #[case("only head\n", "only head", None)]
    #[case("head\n   \r\n ", "head", None)]
    fn splits_on_first_newline(
        #[case] input: &str,
        #[case] short: &str,
        #[case] full: Option<&str>,
    ) {
        let (message, full_message) = split_message(input);
        assert_eq!(message, short);
        assert_eq!(full_message.as_deref(), full);
    }

    #[rstest]
    fn record_displays_level_and_message() {
        let record = LogRecord::new(GelfLevel::Warning, "disk low\ndetails", Context::new());
        assert_eq!(record.to_string(), "warning - disk low");
        assert_eq!(record.full_message.as_deref(), Some("details"));
    }
}
