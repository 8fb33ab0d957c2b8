//! Multi-destination fan-out
//!
//! Routes one formatted line to every entry whose threshold the event
//! level meets, in entry order. With de-duplication enabled, only the
//! entries tied at the highest matching threshold receive the write, so
//! layered sinks (an info file plus an error alerter) do not double-write
//! severe lines. Flush always reaches every destination regardless of
//! dedupe. One sink's failure never blocks the others; failures are
//! reported on an error channel, not thrown from the log call.

use super::destination::{Destination, SharedDestination, WriteMeta};
use super::error::{LoggerError, Result};
use super::level::{LevelRegistry, LevelSpec};
use crossbeam_channel::Sender;

/// A sink write failure, reported out-of-band
#[derive(Debug)]
pub struct SinkError {
    pub destination: String,
    pub error: LoggerError,
}

/// Entry specification handed to [`MultiSinkRouter::route`]: a named
/// level, an optional raw numeric override (raw wins if both given), and
/// the destination.
pub struct RouterEntrySpec {
    pub destination: SharedDestination,
    pub level: Option<LevelSpec>,
    pub raw_level: Option<u32>,
}

impl RouterEntrySpec {
    pub fn named(destination: SharedDestination, level: impl Into<LevelSpec>) -> Self {
        Self {
            destination,
            level: Some(level.into()),
            raw_level: None,
        }
    }

    pub fn raw(destination: SharedDestination, raw_level: u32) -> Self {
        Self {
            destination,
            level: None,
            raw_level: Some(raw_level),
        }
    }
}

#[derive(Clone)]
struct RouterEntry {
    threshold: u32,
    destination: SharedDestination,
}

/// Ordered fan-out over N destinations with per-entry minimum levels
#[derive(Clone, Default)]
pub struct MultiSinkRouter {
    entries: Vec<RouterEntry>,
    dedupe: bool,
}

impl MultiSinkRouter {
    #[must_use]
    pub fn new(dedupe: bool) -> Self {
        Self {
            entries: Vec::new(),
            dedupe,
        }
    }

    /// Build a router from entry specs, resolving named levels through
    /// the active registry. Entry order is preserved.
    pub fn route(specs: Vec<RouterEntrySpec>, dedupe: bool, registry: &LevelRegistry) -> Result<Self> {
        let mut router = Self::new(dedupe);
        for spec in specs {
            router.add(spec, registry)?;
        }
        Ok(router)
    }

    /// Append one entry. Named levels resolve through the registry now,
    /// at add-time; an unknown name fails here, not at first write.
    pub fn add(&mut self, spec: RouterEntrySpec, registry: &LevelRegistry) -> Result<()> {
        let threshold = match (spec.raw_level, spec.level) {
            // Raw numeric override wins when both are given
            (Some(raw), _) => raw,
            (None, Some(level)) => registry.resolve(&level)?,
            (None, None) => {
                return Err(LoggerError::destination(
                    spec.destination.lock().name().to_string(),
                    "router entry needs a level or raw level",
                ))
            }
        };
        self.entries.push(RouterEntry {
            threshold,
            destination: spec.destination,
        });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dedupe(&self) -> bool {
        self.dedupe
    }

    /// A copy with identical destinations but every threshold forced to
    /// one value. Original entries are untouched.
    #[must_use]
    pub fn clone_with_level(&self, level: u32) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| RouterEntry {
                    threshold: level,
                    destination: e.destination.clone(),
                })
                .collect(),
            dedupe: self.dedupe,
        }
    }

    /// A per-child copy: own entry list, shared underlying sinks. A child
    /// adding entries does not affect the parent's router.
    #[must_use]
    pub fn per_child_copy(&self) -> Self {
        self.clone()
    }

    /// Dispatch one line to the matching subset of entries, in entry
    /// order. Write failures go to `errors` and do not prevent delivery
    /// attempts to the remaining destinations.
    pub fn write(
        &self,
        level: u32,
        line: &str,
        meta: &WriteMeta,
        errors: &Sender<SinkError>,
    ) {
        let cutoff = if self.dedupe {
            // Deliver only to entries tied at the highest matching
            // threshold; lower matching entries are suppressed.
            match self
                .entries
                .iter()
                .filter(|e| level >= e.threshold)
                .map(|e| e.threshold)
                .max()
            {
                Some(max) => max,
                None => return,
            }
        } else {
            0
        };

        for entry in &self.entries {
            if level < entry.threshold {
                continue;
            }
            if self.dedupe && entry.threshold != cutoff {
                continue;
            }
            let mut dest = entry.destination.lock();
            let meta_ref = dest.needs_metadata().then_some(meta);
            if let Err(error) = dest.write(line, meta_ref) {
                let _ = errors.send(SinkError {
                    destination: dest.name().to_string(),
                    error,
                });
            }
        }
    }

    /// Flush every destination, dedupe or not. Failures are reported on
    /// the error channel; flushing continues past them.
    pub fn flush(&self, errors: &Sender<SinkError>) {
        for entry in &self.entries {
            let mut dest = entry.destination.lock();
            if let Err(error) = dest.flush() {
                let _ = errors.send(SinkError {
                    destination: dest.name().to_string(),
                    error,
                });
            }
        }
    }
}

/// A logger node's output: one sink or a router
#[derive(Clone)]
pub enum SinkHandle {
    Single(SharedDestination),
    Router(MultiSinkRouter),
}

impl SinkHandle {
    /// Per-child copy: routers get their own entry list over shared
    /// sinks; single sinks are shared directly.
    #[must_use]
    pub fn per_child_copy(&self) -> Self {
        match self {
            SinkHandle::Single(dest) => SinkHandle::Single(dest.clone()),
            SinkHandle::Router(router) => SinkHandle::Router(router.per_child_copy()),
        }
    }

    pub fn write(&self, level: u32, line: &str, meta: &WriteMeta, errors: &Sender<SinkError>) {
        match self {
            SinkHandle::Single(dest) => {
                let mut dest = dest.lock();
                let meta_ref = dest.needs_metadata().then_some(meta);
                if let Err(error) = dest.write(line, meta_ref) {
                    let _ = errors.send(SinkError {
                        destination: dest.name().to_string(),
                        error,
                    });
                }
            }
            SinkHandle::Router(router) => router.write(level, line, meta, errors),
        }
    }

    pub fn flush(&self, errors: &Sender<SinkError>) {
        match self {
            SinkHandle::Single(dest) => {
                let mut dest = dest.lock();
                if let Err(error) = dest.flush() {
                    let _ = errors.send(SinkError {
                        destination: dest.name().to_string(),
                        error,
                    });
                }
            }
            SinkHandle::Router(router) => router.flush(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::destination::shared;
    use crate::destinations::MemoryDestination;
    use crossbeam_channel::unbounded;

    fn meta(level: u32) -> WriteMeta {
        WriteMeta {
            level,
            ..WriteMeta::default()
        }
    }

    #[test]
    fn test_ordered_delivery_without_dedupe() {
        let registry = LevelRegistry::standard();
        let a = MemoryDestination::new("a");
        let b = MemoryDestination::new("b");
        let router = MultiSinkRouter::route(
            vec![
                RouterEntrySpec::named(shared(a.clone()), "info"),
                RouterEntrySpec::named(shared(b.clone()), "error"),
            ],
            false,
            &registry,
        )
        .unwrap();
        let (tx, _rx) = unbounded();

        router.write(60, "{\"level\":60}\n", &meta(60), &tx);
        assert_eq!(a.line_count(), 1);
        assert_eq!(b.line_count(), 1);

        router.write(30, "{\"level\":30}\n", &meta(30), &tx);
        assert_eq!(a.line_count(), 2);
        assert_eq!(b.line_count(), 1);
    }

    #[test]
    fn test_dedupe_delivers_to_most_specific_only() {
        let registry = LevelRegistry::standard();
        let file = MemoryDestination::new("file");
        let alerts = MemoryDestination::new("alerts");
        let router = MultiSinkRouter::route(
            vec![
                RouterEntrySpec::named(shared(file.clone()), "info"),
                RouterEntrySpec::named(shared(alerts.clone()), "fatal"),
            ],
            true,
            &registry,
        )
        .unwrap();
        let (tx, _rx) = unbounded();

        router.write(60, "{\"level\":60}\n", &meta(60), &tx);
        assert_eq!(alerts.line_count(), 1);
        assert_eq!(file.line_count(), 0);

        // Below the alert threshold the file is the most specific match
        router.write(30, "{\"level\":30}\n", &meta(30), &tx);
        assert_eq!(file.line_count(), 1);
        assert_eq!(alerts.line_count(), 1);
    }

    #[test]
    fn test_dedupe_three_overlapping_entries() {
        let registry = LevelRegistry::standard();
        let low = MemoryDestination::new("low");
        let mid = MemoryDestination::new("mid");
        let mid2 = MemoryDestination::new("mid2");
        let router = MultiSinkRouter::route(
            vec![
                RouterEntrySpec::named(shared(low.clone()), "debug"),
                RouterEntrySpec::named(shared(mid.clone()), "warn"),
                RouterEntrySpec::named(shared(mid2.clone()), "warn"),
            ],
            true,
            &registry,
        )
        .unwrap();
        let (tx, _rx) = unbounded();

        // Ties at the highest matching threshold all receive the write
        router.write(50, "{\"level\":50}\n", &meta(50), &tx);
        assert_eq!(low.line_count(), 0);
        assert_eq!(mid.line_count(), 1);
        assert_eq!(mid2.line_count(), 1);
    }

    #[test]
    fn test_no_matching_entry_no_write() {
        let registry = LevelRegistry::standard();
        let only = MemoryDestination::new("only");
        let router = MultiSinkRouter::route(
            vec![RouterEntrySpec::named(shared(only.clone()), "error")],
            true,
            &registry,
        )
        .unwrap();
        let (tx, _rx) = unbounded();
        router.write(30, "{\"level\":30}\n", &meta(30), &tx);
        assert_eq!(only.line_count(), 0);
    }

    #[test]
    fn test_raw_level_wins_over_named() {
        let registry = LevelRegistry::standard();
        let dest = MemoryDestination::new("d");
        let mut router = MultiSinkRouter::new(false);
        router
            .add(
                RouterEntrySpec {
                    destination: shared(dest.clone()),
                    level: Some("fatal".into()),
                    raw_level: Some(25),
                },
                &registry,
            )
            .unwrap();
        let (tx, _rx) = unbounded();
        router.write(30, "{\"level\":30}\n", &meta(30), &tx);
        assert_eq!(dest.line_count(), 1);
    }

    #[test]
    fn test_add_rejects_unknown_level_at_add_time() {
        let registry = LevelRegistry::standard();
        let mut router = MultiSinkRouter::new(false);
        let err = router
            .add(
                RouterEntrySpec::named(shared(MemoryDestination::new("d")), "verbose"),
                &registry,
            )
            .unwrap_err();
        assert!(matches!(err, LoggerError::UnknownLevel(_)));
    }

    #[test]
    fn test_failure_does_not_block_siblings() {
        let registry = LevelRegistry::standard();
        let failing = MemoryDestination::failing("broken");
        let healthy = MemoryDestination::new("healthy");
        let router = MultiSinkRouter::route(
            vec![
                RouterEntrySpec::named(shared(failing), "info"),
                RouterEntrySpec::named(shared(healthy.clone()), "info"),
            ],
            false,
            &registry,
        )
        .unwrap();
        let (tx, rx) = unbounded();

        router.write(30, "{\"level\":30}\n", &meta(30), &tx);
        assert_eq!(healthy.line_count(), 1);

        let reported = rx.try_recv().unwrap();
        assert_eq!(reported.destination, "broken");
    }

    #[test]
    fn test_flush_reaches_every_destination() {
        let registry = LevelRegistry::standard();
        let a = MemoryDestination::new("a");
        let b = MemoryDestination::new("b");
        let router = MultiSinkRouter::route(
            vec![
                RouterEntrySpec::named(shared(a.clone()), "info"),
                RouterEntrySpec::named(shared(b.clone()), "fatal"),
            ],
            true,
            &registry,
        )
        .unwrap();
        let (tx, _rx) = unbounded();
        router.flush(&tx);
        assert_eq!(a.flush_count(), 1);
        assert_eq!(b.flush_count(), 1);
    }

    #[test]
    fn test_clone_with_level() {
        let registry = LevelRegistry::standard();
        let a = MemoryDestination::new("a");
        let b = MemoryDestination::new("b");
        let original = MultiSinkRouter::route(
            vec![
                RouterEntrySpec::named(shared(a.clone()), "info"),
                RouterEntrySpec::named(shared(b.clone()), "fatal"),
            ],
            false,
            &registry,
        )
        .unwrap();
        let uniform = original.clone_with_level(20);
        let (tx, _rx) = unbounded();

        // Uniform view delivers a debug line everywhere
        uniform.write(20, "{\"level\":20}\n", &meta(20), &tx);
        assert_eq!(a.line_count(), 1);
        assert_eq!(b.line_count(), 1);

        // Original thresholds untouched
        original.write(20, "{\"level\":20}\n", &meta(20), &tx);
        assert_eq!(a.line_count(), 1);
        assert_eq!(b.line_count(), 1);
    }
}
