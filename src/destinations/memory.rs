//! In-memory capture destination for tests
//!
//! Records every written line (and, when metadata capture is on, the
//! accompanying [`WriteMeta`]) and parses lines back into JSON values for
//! assertions. Clones share storage, so a test can keep a handle while
//! the logger owns another.

use crate::core::{Destination, LoggerError, Result, WriteMeta};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

#[derive(Default)]
struct MemoryInner {
    lines: Vec<String>,
    metas: Vec<WriteMeta>,
    flushes: usize,
}

#[derive(Clone)]
pub struct MemoryDestination {
    name: String,
    inner: Arc<RwLock<MemoryInner>>,
    capture_meta: bool,
    fail_writes: bool,
}

impl MemoryDestination {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(RwLock::new(MemoryInner::default())),
            capture_meta: false,
            fail_writes: false,
        }
    }

    /// Capture destination that opts into write metadata
    pub fn with_metadata(name: impl Into<String>) -> Self {
        Self {
            capture_meta: true,
            ..Self::new(name)
        }
    }

    /// Destination whose every write fails; for error-channel tests
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(name)
        }
    }

    pub fn line_count(&self) -> usize {
        self.inner.read().lines.len()
    }

    pub fn flush_count(&self) -> usize {
        self.inner.read().flushes
    }

    /// Raw captured lines, terminators included
    pub fn lines(&self) -> Vec<String> {
        self.inner.read().lines.clone()
    }

    /// Parse every captured line back into a JSON value
    pub fn parsed(&self) -> Result<Vec<Value>> {
        self.inner
            .read()
            .lines
            .iter()
            .map(|line| serde_json::from_str(line.trim_end()).map_err(LoggerError::from))
            .collect()
    }

    /// Parse the most recent line
    pub fn last_parsed(&self) -> Option<Value> {
        let inner = self.inner.read();
        let line = inner.lines.last()?;
        serde_json::from_str(line.trim_end()).ok()
    }

    /// Captured metadata, in write order
    pub fn metas(&self) -> Vec<WriteMeta> {
        self.inner.read().metas.clone()
    }
}

impl Destination for MemoryDestination {
    fn write(&mut self, line: &str, meta: Option<&WriteMeta>) -> Result<()> {
        if self.fail_writes {
            return Err(LoggerError::writer(format!(
                "destination '{}' is closed",
                self.name
            )));
        }
        let mut inner = self.inner.write();
        inner.lines.push(line.to_string());
        if let Some(meta) = meta {
            inner.metas.push(meta.clone());
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.write().flushes += 1;
        Ok(())
    }

    fn needs_metadata(&self) -> bool {
        self.capture_meta
    }

    fn name(&self) -> &str {
        &self.name
    }
}
