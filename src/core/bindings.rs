//! Bindings fragments and the child chain
//!
//! Each logger node's contextual fields are serialized exactly once, at
//! creation time, into an immutable comma-prefixed JSON fragment
//! (`,"a":"b"`). A node's effective bindings are the concatenation of
//! fragments root to leaf; a child extends its parent's already
//! concatenated chain in O(1), never re-walking ancestors.

use super::error::Result;
use super::redact::Redactor;
use super::serializers::SerializerMap;
use super::stringify::{object_fragment, StringifyMode};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The accumulated, pre-serialized ancestor context of a logger node.
///
/// Cloning is cheap (`Arc` bump); the underlying string is immutable.
#[derive(Debug, Clone)]
pub struct BindingsChain {
    chain: Arc<str>,
}

impl BindingsChain {
    /// Chain with no bindings at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            chain: Arc::from(""),
        }
    }

    /// Root chain from a single pre-built fragment
    #[must_use]
    pub fn root(fragment: &str) -> Self {
        Self {
            chain: Arc::from(fragment),
        }
    }

    /// Extend with a child's own fragment. One concatenation over the
    /// parent's flattened chain; ancestors are not re-serialized.
    #[must_use]
    pub fn extend(&self, own_fragment: &str) -> Self {
        if own_fragment.is_empty() {
            return self.clone();
        }
        let mut combined = String::with_capacity(self.chain.len() + own_fragment.len());
        combined.push_str(&self.chain);
        combined.push_str(own_fragment);
        Self {
            chain: Arc::from(combined.as_str()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.chain
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

/// Serialize one node's own bindings into its comma-prefixed fragment.
///
/// The effective serializers and redaction run here, once; later mutation
/// of the map the caller built this from cannot affect the fragment.
pub fn build_fragment(
    mut bindings: Map<String, Value>,
    serializers: &SerializerMap,
    redactor: Option<&Redactor>,
    mode: StringifyMode,
) -> Result<String> {
    if bindings.is_empty() {
        return Ok(String::new());
    }
    serializers.apply(&mut bindings);
    let value = match redactor {
        Some(r) => r.apply(Value::Object(bindings)),
        None => Value::Object(bindings),
    };
    match value {
        Value::Object(map) => object_fragment(&map, mode),
        // Redaction cannot change the top-level shape here, but stay total
        other => Ok(format!(",{}", other)),
    }
}
