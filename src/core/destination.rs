//! Destination trait for formatted log lines
//!
//! A destination consumes completed NDJSON lines. It may opt into
//! receiving an out-of-band metadata struct alongside each write via
//! [`Destination::needs_metadata`]; the dispatcher then populates a
//! [`WriteMeta`] with the event's level, message, merge object, time
//! fragment, and logger name immediately before the write.

use super::error::Result;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Out-of-band metadata passed alongside a write when the destination
/// opts in. Lets fan-out layers reconstruct per-destination filtering
/// without re-parsing the formatted line.
#[derive(Debug, Clone, Default)]
pub struct WriteMeta {
    pub level: u32,
    pub level_label: String,
    pub message: Option<String>,
    pub merge_object: Option<Value>,
    pub time_fragment: String,
    pub logger_name: Option<String>,
}

pub trait Destination: Send + Sync {
    /// Consume one completed line (terminator included). `meta` is
    /// populated only for destinations that request it.
    fn write(&mut self, line: &str, meta: Option<&WriteMeta>) -> Result<()>;

    /// Drain buffered-but-unwritten data. Idempotent; a no-op for
    /// unbuffered sinks.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Opt in to receiving [`WriteMeta`] with each write
    fn needs_metadata(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// Shared handle to a destination; cheap to clone, safe across threads.
pub type SharedDestination = Arc<Mutex<dyn Destination>>;

/// Wrap a destination for sharing
pub fn shared<D: Destination + 'static>(destination: D) -> SharedDestination {
    Arc::new(Mutex::new(destination))
}
