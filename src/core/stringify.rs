//! JSON stringification with bounded nesting
//!
//! The default (safe) mode never fails on a log call: values nested past
//! the depth cap are elided with a marker. The strict mode surfaces a
//! hard error instead, and the line is not written. User callbacks that
//! panic are isolated per field, degrading that one field to a marker
//! rather than aborting the whole line.

use super::error::{LoggerError, Result};
use serde_json::{Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Substituted for a field whose user callback panicked
pub const SERIALIZE_ERROR_MARKER: &str = "[unable to serialize]";

/// Substituted for content elided past the depth cap in safe mode
pub const TRUNCATED_MARKER: &str = "[Truncated]";

/// Default recursion depth cap
pub const DEFAULT_DEPTH_LIMIT: usize = 128;

/// Serialization discipline for event payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringifyMode {
    /// Elide over-deep content with [`TRUNCATED_MARKER`]
    Safe { max_depth: usize },
    /// Error on over-deep content; the log line is not written
    Strict { max_depth: usize },
}

impl Default for StringifyMode {
    fn default() -> Self {
        StringifyMode::Safe {
            max_depth: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl StringifyMode {
    fn max_depth(&self) -> usize {
        match self {
            StringifyMode::Safe { max_depth } | StringifyMode::Strict { max_depth } => *max_depth,
        }
    }

    fn is_strict(&self) -> bool {
        matches!(self, StringifyMode::Strict { .. })
    }
}

/// Serialize a value under the given mode
pub fn stringify(value: &Value, mode: StringifyMode) -> Result<String> {
    let mut out = String::with_capacity(64);
    write_value(&mut out, value, mode, 0)?;
    Ok(out)
}

/// Serialize an object's own fields as a comma-prefixed fragment
/// (`,"k":v,...`), ready to splice into a JSON object body. An empty map
/// yields an empty string.
pub fn object_fragment(map: &Map<String, Value>, mode: StringifyMode) -> Result<String> {
    let mut out = String::with_capacity(32 * map.len());
    for (key, value) in map {
        out.push(',');
        write_escaped(&mut out, key);
        out.push(':');
        write_value(&mut out, value, mode, 1)?;
    }
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, mode: StringifyMode, depth: usize) -> Result<()> {
    if depth > mode.max_depth() {
        if mode.is_strict() {
            return Err(LoggerError::DepthLimit {
                limit: mode.max_depth(),
            });
        }
        write_escaped(out, TRUNCATED_MARKER);
        return Ok(());
    }
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_escaped(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, mode, depth + 1)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_escaped(out, key);
                out.push(':');
                write_value(out, item, mode, depth + 1)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_escaped(out: &mut String, s: &str) {
    // serde_json's string escaping, via the scalar serializer
    out.push_str(&serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string()));
}

/// Run a user-supplied callback with panic isolation. A panic yields
/// `None`; the caller substitutes [`SERIALIZE_ERROR_MARKER`] for that one
/// field and the rest of the line is still produced.
pub fn guard_callback<T>(f: impl FnOnce() -> T) -> Option<T> {
    catch_unwind(AssertUnwindSafe(f)).ok()
}
