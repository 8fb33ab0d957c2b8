//! Field redaction
//!
//! Compiles a set of dotted paths (optional trailing one-level `*`
//! wildcard) into a reusable censor applied to event payloads at
//! serialization time. Application always produces a new value; the
//! caller's object graph is never touched.

use super::error::{LoggerError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Replacement text used when no explicit censor is configured
pub const DEFAULT_CENSOR: &str = "[Redacted]";

/// Censor function: receives the value being censored and the path that
/// matched it, returns the replacement.
pub type CensorFn = Arc<dyn Fn(&Value, &[String]) -> Value + Send + Sync>;

/// What to do with a matched leaf
#[derive(Clone)]
pub enum Censor {
    /// Replace with a static JSON value
    Value(Value),
    /// Replace with the result of a function call
    Fn(CensorFn),
    /// Delete the key and value entirely, changing the emitted shape
    Remove,
}

impl Default for Censor {
    fn default() -> Self {
        Censor::Value(Value::String(DEFAULT_CENSOR.to_string()))
    }
}

impl std::fmt::Debug for Censor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Censor::Value(v) => write!(f, "Value({})", v),
            Censor::Fn(_) => write!(f, "Fn(..)"),
            Censor::Remove => write!(f, "Remove"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Wildcard,
}

#[derive(Debug, Clone)]
struct CompiledPath {
    segments: Vec<Segment>,
}

/// Compiled redaction rule set, built once per logger and reused across
/// calls. Path strings are never reparsed after construction.
#[derive(Debug, Clone)]
pub struct Redactor {
    paths: Vec<CompiledPath>,
    censor: Censor,
}

impl Redactor {
    /// Compile a list of path strings with the given censor.
    ///
    /// Fails eagerly on any syntactically invalid path, before any
    /// logging occurs.
    pub fn compile(paths: &[String], censor: Censor) -> Result<Self> {
        let mut compiled = Vec::with_capacity(paths.len());
        for path in paths {
            compiled.push(Self::parse_path(path)?);
        }
        Ok(Self {
            paths: compiled,
            censor,
        })
    }

    fn parse_path(path: &str) -> Result<CompiledPath> {
        if path.is_empty() {
            return Err(LoggerError::redact_path(path, "path is empty"));
        }
        let raw_segments: Vec<&str> = path.split('.').collect();
        let mut segments = Vec::with_capacity(raw_segments.len());
        let last = raw_segments.len() - 1;
        for (i, seg) in raw_segments.iter().enumerate() {
            if seg.is_empty() {
                return Err(LoggerError::redact_path(path, "empty segment"));
            }
            if *seg == "*" {
                if i != last {
                    return Err(LoggerError::redact_path(
                        path,
                        "wildcard only allowed as the final segment",
                    ));
                }
                if raw_segments.len() == 1 {
                    return Err(LoggerError::redact_path(
                        path,
                        "bare wildcard needs a path prefix",
                    ));
                }
                segments.push(Segment::Wildcard);
            } else if seg.contains('*') {
                return Err(LoggerError::redact_path(
                    path,
                    "wildcard must be a whole segment",
                ));
            } else {
                segments.push(Segment::Key((*seg).to_string()));
            }
        }
        Ok(CompiledPath { segments })
    }

    /// Number of compiled paths
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Apply the rule set, returning a new value. The input is consumed;
    /// use [`apply_ref`](Self::apply_ref) to keep the original.
    #[must_use]
    pub fn apply(&self, mut value: Value) -> Value {
        for path in &self.paths {
            Self::apply_path(&mut value, &path.segments, &self.censor, &mut Vec::new());
        }
        value
    }

    /// Apply over a borrowed value; the original is left untouched.
    #[must_use]
    pub fn apply_ref(&self, value: &Value) -> Value {
        self.apply(value.clone())
    }

    fn replacement(censor: &Censor, current: &Value, trail: &[String]) -> Option<Value> {
        match censor {
            Censor::Value(v) => Some(v.clone()),
            Censor::Fn(f) => Some(f(current, trail)),
            Censor::Remove => None,
        }
    }

    fn apply_path(value: &mut Value, segments: &[Segment], censor: &Censor, trail: &mut Vec<String>) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };
        let Value::Object(map) = value else {
            return;
        };

        match head {
            Segment::Wildcard => {
                // One level only, never recursive
                let keys: Vec<String> = map.keys().cloned().collect();
                for key in keys {
                    trail.push(key.clone());
                    let current = &map[&key];
                    match Self::replacement(censor, current, trail) {
                        Some(rep) => {
                            map.insert(key, rep);
                        }
                        None => {
                            map.shift_remove(&key);
                        }
                    }
                    trail.pop();
                }
            }
            Segment::Key(key) if rest.is_empty() => {
                if let Some(current) = map.get(key.as_str()) {
                    trail.push(key.clone());
                    match Self::replacement(censor, current, trail) {
                        Some(rep) => {
                            map.insert(key.clone(), rep);
                        }
                        None => {
                            map.shift_remove(key.as_str());
                        }
                    }
                    trail.pop();
                }
            }
            Segment::Key(key) => {
                if let Some(next) = map.get_mut(key.as_str()) {
                    trail.push(key.clone());
                    Self::apply_path(next, rest, censor, trail);
                    trail.pop();
                }
            }
        }
    }
}
