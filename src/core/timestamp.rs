//! Timestamp fragment rendering
//!
//! The line formatter splices a pre-formatted, comma-prefixed JSON
//! fragment (e.g. `,"time":1736332245123`) directly into the output line.
//! Formats cover the common aggregator expectations (epoch millis/seconds,
//! ISO 8601) plus a user-supplied function for anything else.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::sync::Arc;

/// User-supplied time function returning a complete comma-prefixed
/// fragment, e.g. `,"time":"12:34:56"`.
pub type TimeFragmentFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Selects how (and whether) the time field is rendered
#[derive(Clone, Default)]
pub enum TimeFormat {
    /// No time field at all
    Off,

    /// Epoch milliseconds integer: `,"time":1736332245123`
    #[default]
    EpochMillis,

    /// Epoch seconds integer: `,"time":1736332245`
    EpochSecs,

    /// ISO 8601 string with milliseconds: `,"time":"2025-01-08T10:30:45.123Z"`
    Iso8601,

    /// User function returning a pre-formatted comma-prefixed fragment
    Custom(TimeFragmentFn),
}

impl TimeFormat {
    /// Render the fragment for the current instant
    #[must_use]
    pub fn fragment(&self) -> String {
        match self {
            TimeFormat::Custom(f) => f(),
            _ => self.fragment_at(Utc::now()),
        }
    }

    /// Render the fragment for a fixed instant (custom functions ignore
    /// the instant; they own their clock)
    #[must_use]
    pub fn fragment_at(&self, datetime: DateTime<Utc>) -> String {
        match self {
            TimeFormat::Off => String::new(),
            TimeFormat::EpochMillis => format!(",\"time\":{}", datetime.timestamp_millis()),
            TimeFormat::EpochSecs => format!(",\"time\":{}", datetime.timestamp()),
            TimeFormat::Iso8601 => format!(
                ",\"time\":\"{}\"",
                datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            TimeFormat::Custom(f) => f(),
        }
    }

    /// Whether this format produces a numeric time value
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimeFormat::EpochMillis | TimeFormat::EpochSecs)
    }
}

impl fmt::Debug for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::Off => write!(f, "Off"),
            TimeFormat::EpochMillis => write!(f, "EpochMillis"),
            TimeFormat::EpochSecs => write!(f, "EpochSecs"),
            TimeFormat::Iso8601 => write!(f, "Iso8601"),
            TimeFormat::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
