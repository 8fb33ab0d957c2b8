//! Per-field value serializers
//!
//! A serializer is keyed by field name and transforms that field's value
//! before it is written. Returning `None` strips the field from the
//! output entirely. Child loggers merge serializer maps
//! override-not-replace: the parent's map is the base, the child's
//! entries win, transitively through any nesting depth.

use super::stringify::{guard_callback, SERIALIZE_ERROR_MARKER};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Field serializer: transforms the value, or strips it by returning `None`
pub type SerializerFn = Arc<dyn Fn(Value) -> Option<Value> + Send + Sync>;

#[derive(Clone, Default)]
pub struct SerializerMap {
    map: HashMap<String, SerializerFn>,
}

impl SerializerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, f: SerializerFn) {
        self.map.insert(key.into(), f);
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, f: SerializerFn) -> Self {
        self.insert(key, f);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SerializerFn> {
        self.map.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Parent-as-base merge: entries in `overrides` replace same-keyed
    /// entries here, everything else is inherited.
    #[must_use]
    pub fn merged_with(&self, overrides: &SerializerMap) -> SerializerMap {
        let mut merged = self.clone();
        for (key, f) in &overrides.map {
            merged.map.insert(key.clone(), Arc::clone(f));
        }
        merged
    }

    /// Run configured serializers over a field map in place.
    ///
    /// A serializer returning `None` removes the field. A panicking
    /// serializer degrades its field to the fixed marker string; the rest
    /// of the map is unaffected.
    pub fn apply(&self, fields: &mut Map<String, Value>) {
        if self.map.is_empty() {
            return;
        }
        let keys: Vec<String> = fields
            .keys()
            .filter(|k| self.map.contains_key(*k))
            .cloned()
            .collect();
        for key in keys {
            let serializer = &self.map[&key];
            let Some(original) = fields.get(&key).cloned() else {
                continue;
            };
            match guard_callback(|| serializer(original)) {
                Some(Some(replaced)) => {
                    fields.insert(key, replaced);
                }
                Some(None) => {
                    fields.shift_remove(&key);
                }
                None => {
                    fields.insert(key, Value::String(SERIALIZE_ERROR_MARKER.to_string()));
                }
            }
        }
    }
}

impl fmt::Debug for SerializerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("SerializerMap").field("keys", &keys).finish()
    }
}

/// Standard serializer for error-shaped values: objects carrying
/// `message` and `stack` are rewritten with `type`, `message`, `stack`
/// promoted as the first three keys, ahead of any other properties. An
/// explicitly set `type` property wins over the `"Error"` default.
pub fn error_serializer(value: Value) -> Option<Value> {
    let Value::Object(map) = value else {
        return Some(value);
    };
    if !map.contains_key("message") || !map.contains_key("stack") {
        return Some(Value::Object(map));
    }

    let type_name = map
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("Error")
        .to_string();

    let mut promoted = Map::new();
    promoted.insert("type".to_string(), Value::String(type_name));
    promoted.insert("message".to_string(), map["message"].clone());
    promoted.insert("stack".to_string(), map["stack"].clone());
    for (key, val) in map {
        if key != "type" && key != "message" && key != "stack" {
            promoted.insert(key, val);
        }
    }
    Some(Value::Object(promoted))
}
