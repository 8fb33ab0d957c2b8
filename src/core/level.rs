//! Level definitions and the level registry
//!
//! The registry maps level names to numeric severities (higher = more
//! severe) and is the single authority for enabled/disabled decisions.
//! Standard levels are fixed at construction; custom levels may be added
//! later but never collide with existing names or values.

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Sentinel severity that disables all output. Always compares greater
/// than any real level value, so a `silent` threshold mutes custom levels
/// added after the threshold was set.
pub const SILENT: u32 = u32::MAX;

/// The six standard severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Trace = 10,
    Debug = 20,
    #[default]
    Info = 30,
    Warn = 40,
    Error = 50,
    Fatal = 60,
}

impl LogLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    pub fn value(&self) -> u32 {
        *self as u32
    }

    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// A level named either by label or by raw numeric value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSpec {
    Name(String),
    Value(u32),
}

impl From<&str> for LevelSpec {
    fn from(s: &str) -> Self {
        LevelSpec::Name(s.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(s: String) -> Self {
        LevelSpec::Name(s)
    }
}

impl From<u32> for LevelSpec {
    fn from(v: u32) -> Self {
        LevelSpec::Value(v)
    }
}

impl From<LogLevel> for LevelSpec {
    fn from(l: LogLevel) -> Self {
        LevelSpec::Value(l.value())
    }
}

/// Payload delivered to level-change observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChange {
    pub new_label: String,
    pub new_value: u32,
    pub old_label: String,
    pub old_value: u32,
}

/// Callback invoked when a logger node's threshold changes
pub type LevelObserver = Arc<dyn Fn(&LevelChange) + Send + Sync>;

/// Name/value table for standard plus custom levels.
///
/// Copied by value into children that declare no customization; a child
/// adding custom levels clones and extends its own copy, so siblings never
/// observe each other's additions.
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    by_name: HashMap<String, u32>,
    by_value: BTreeMap<u32, String>,
}

impl LevelRegistry {
    /// The fixed standard table: trace=10 through fatal=60, plus the
    /// `silent` pseudo-level mapped to the sentinel.
    #[must_use]
    pub fn standard() -> Self {
        let mut by_name = HashMap::new();
        let mut by_value = BTreeMap::new();
        for level in LogLevel::ALL {
            by_name.insert(level.to_str().to_string(), level.value());
            by_value.insert(level.value(), level.to_str().to_string());
        }
        by_name.insert("silent".to_string(), SILENT);
        by_value.insert(SILENT, "silent".to_string());
        Self { by_name, by_value }
    }

    /// Return a new registry equal to the receiver plus one custom entry.
    ///
    /// Fails if the name already exists (standard names and `silent`
    /// included) or the value already exists (the six standard values and
    /// the sentinel are always reserved).
    pub fn with_custom(&self, name: &str, value: u32) -> Result<Self> {
        let mut next = self.clone();
        next.add_custom(name, value)?;
        Ok(next)
    }

    /// In-place variant of [`with_custom`](Self::with_custom)
    pub fn add_custom(&mut self, name: &str, value: u32) -> Result<()> {
        if name.is_empty() {
            return Err(LoggerError::config("custom_levels", "level name is empty"));
        }
        if self.by_name.contains_key(name) || name == "silent" {
            return Err(LoggerError::name_collision(name));
        }
        // Standard values and the sentinel stay reserved even if this
        // registry were ever built without them.
        let reserved = LogLevel::ALL.iter().any(|l| l.value() == value) || value == SILENT;
        if reserved || self.by_value.contains_key(&value) {
            return Err(LoggerError::value_collision(value));
        }
        self.by_name.insert(name.to_string(), value);
        self.by_value.insert(value, name.to_string());
        Ok(())
    }

    /// Resolve a name or raw numeric value to its numeric severity.
    ///
    /// Raw numbers must be registered; an unregistered number aliases
    /// nothing and is rejected.
    pub fn resolve(&self, spec: &LevelSpec) -> Result<u32> {
        match spec {
            LevelSpec::Name(name) => self
                .by_name
                .get(name.as_str())
                .copied()
                .ok_or_else(|| LoggerError::unknown_level(name.clone())),
            LevelSpec::Value(value) => {
                if self.by_value.contains_key(value) {
                    Ok(*value)
                } else {
                    Err(LoggerError::unknown_level(value.to_string()))
                }
            }
        }
    }

    /// Label for a registered numeric value
    #[must_use]
    pub fn label_for(&self, value: u32) -> Option<&str> {
        self.by_value.get(&value).map(String::as_str)
    }

    /// The sole enabled/disabled decision rule: numeric `>=` comparison.
    #[inline]
    #[must_use]
    pub fn is_at_least(call_level: u32, threshold: u32) -> bool {
        call_level >= threshold
    }

    /// Iterate all registered (name, value) pairs in ascending value
    /// order, excluding the `silent` sentinel (it is not callable).
    pub fn callable_levels(&self) -> impl Iterator<Item = (&str, u32)> {
        self.by_value
            .iter()
            .filter(|(v, _)| **v != SILENT)
            .map(|(v, n)| (n.as_str(), *v))
    }

    /// Iterate custom (non-standard) levels
    pub fn custom_levels(&self) -> impl Iterator<Item = (&str, u32)> {
        self.callable_levels()
            .filter(|(_, v)| !LogLevel::ALL.iter().any(|l| l.value() == *v))
    }

    /// Merge another set of custom levels into a copy of this registry,
    /// validating every entry. Used by `child()` for custom-level maps.
    pub fn merged_with(&self, custom: &[(String, u32)]) -> Result<Self> {
        let mut next = self.clone();
        for (name, value) in custom {
            next.add_custom(name, *value)?;
        }
        Ok(next)
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
