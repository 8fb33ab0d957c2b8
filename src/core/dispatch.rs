//! Call dispatch and argument normalization
//!
//! The dispatch table is rebuilt whenever the registry or threshold
//! changes (rebuild-on-mutation, not rebuild-on-read): each registered
//! level gets one entry with its enabled flag precomputed, so the
//! disabled hot path is a single map lookup and boolean test with no
//! formatting, no callback invocation, and no allocation.

use super::interp::{format_message, stringify_arg};
use super::level::{LevelRegistry, SILENT};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One callable level in the dispatch table
#[derive(Debug, Clone)]
pub struct DispatchEntry {
    pub label: String,
    pub value: u32,
    pub enabled: bool,
}

/// Per-level dispatch state for one logger node
#[derive(Debug, Clone)]
pub struct DispatchTable {
    entries: HashMap<String, DispatchEntry>,
    threshold: u32,
}

impl DispatchTable {
    /// Build the table for a registry and threshold. A level added below
    /// the current threshold is installed but stays disabled until the
    /// threshold is lowered.
    #[must_use]
    pub fn rebuild(registry: &LevelRegistry, threshold: u32) -> Self {
        let mut entries = HashMap::new();
        for (name, value) in registry.callable_levels() {
            entries.insert(
                name.to_string(),
                DispatchEntry {
                    label: name.to_string(),
                    value,
                    enabled: LevelRegistry::is_at_least(value, threshold),
                },
            );
        }
        Self { entries, threshold }
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&DispatchEntry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Enabled check for a raw numeric level
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, value: u32) -> bool {
        LevelRegistry::is_at_least(value, self.threshold)
    }

    /// Whether the table mutes everything (silent threshold)
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.threshold == SILENT
    }
}

/// The outcome of argument normalization: an optional merge object plus
/// an optional rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCall {
    pub merge: Option<Map<String, Value>>,
    pub msg: Option<String>,
}

/// Normalize a raw argument list.
///
/// A leading object-like value becomes the merge object and the remaining
/// arguments form the message; otherwise the first argument is the
/// message (or printf format string) and all arguments feed message
/// formatting. A single non-string scalar is stringified.
#[must_use]
pub fn normalize(args: &[Value]) -> NormalizedCall {
    match args.split_first() {
        None => NormalizedCall {
            merge: None,
            msg: None,
        },
        Some((Value::Object(map), rest)) => NormalizedCall {
            merge: Some(map.clone()),
            msg: build_message(rest),
        },
        Some(_) => NormalizedCall {
            merge: None,
            msg: build_message(args),
        },
    }
}

fn build_message(args: &[Value]) -> Option<String> {
    let (first, rest) = args.split_first()?;
    Some(match first {
        Value::String(fmt) => format_message(fmt, rest),
        other if rest.is_empty() => stringify_arg(other),
        other => {
            let mut out = stringify_arg(other);
            for arg in rest {
                out.push(' ');
                out.push_str(&stringify_arg(arg));
            }
            out
        }
    })
}
