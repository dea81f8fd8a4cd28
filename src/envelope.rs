//! Final GELF field set for one log event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::flatten::AdditionalFields;
use crate::level::GelfLevel;

/// GELF protocol version written to every message.
pub const GELF_VERSION: &str = "1.1";

/// Flat GELF message ready for encoding.
///
/// The fixed fields are serialised after the additional fields so they
/// always take precedence. Additional field names start with `_` and never
/// collide with a fixed field name.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub host: String,
    pub timestamp: DateTime<Utc>,
    pub level: GelfLevel,
    pub message: String,
    pub full_message: Option<String>,
    pub additional: AdditionalFields,
}

impl Envelope {
    /// Seconds since the epoch with microsecond precision.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp.timestamp_micros() as f64 / 1_000_000.0
    }

    fn count_fields(&self) -> usize {
        5 + usize::from(self.full_message.is_some()) + self.additional.len()
    }
}

impl Serialize for Envelope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.count_fields()))?;
        for (key, value) in &self.additional {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("version", GELF_VERSION)?;
        map.serialize_entry("host", &self.host)?;
        map.serialize_entry("timestamp", &self.timestamp_secs())?;
        map.serialize_entry("level", &self.level.code())?;
        map.serialize_entry("message", &self.message)?;
        if let Some(full) = &self.full_message {
            map.serialize_entry("full_message", full)?;
        }
        map.end()
    }
}
