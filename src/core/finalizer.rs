//! Termination coordination
//!
//! The hosting application owns process termination (signal handlers,
//! panic hooks); the core only offers a narrow collaborator it can call
//! into. Finalizers registered here run exactly once even when multiple
//! termination signals arrive in quick succession, giving fatal-level
//! lines a last chance to flush.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

type Finalizer = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub struct TerminationCoordinator {
    finalizers: Mutex<Vec<Finalizer>>,
    fired: AtomicBool,
}

impl TerminationCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a finalizer. Registration after the coordinator has fired
    /// runs the finalizer immediately; the termination window is already
    /// open and a deferred run would never come.
    pub fn register_finalizer(&self, f: impl FnOnce() + Send + 'static) {
        if self.fired.load(Ordering::Acquire) {
            f();
            return;
        }
        self.finalizers.lock().push(Box::new(f));
    }

    /// Run all registered finalizers, exactly once across any number of
    /// calls. Later calls are no-ops.
    pub fn run_finalizers_once(&self) {
        if self.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        let pending = std::mem::take(&mut *self.finalizers.lock());
        for finalizer in pending {
            finalizer();
        }
    }

    /// Whether the coordinator has already fired
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
