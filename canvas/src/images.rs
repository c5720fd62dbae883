//! Browser image-load bookkeeping.
//!
//! The browser reports each image through `onload`/`onerror` callbacks that
//! fire outside the scene. [`ImageLoads`] tracks which loads of the current
//! run are still outstanding and whether the engine is waiting on them, and
//! turns each outcome into a [`Settled`] verdict for the scene to act on.
//! Outcomes from an earlier run are stale and ignored.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

use std::collections::HashSet;

/// What one finished load means for the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Not a load of the current run.
    Stale,
    /// Loaded; other loads are still outstanding or nobody is waiting.
    Pending,
    /// The last outstanding load finished while the engine was waiting.
    BarrierReady,
    /// The load failed; the run must stop and the barrier never answers.
    Failed,
}

/// Outstanding loads for one run.
#[derive(Debug, Default)]
pub struct ImageLoads {
    run: u64,
    pending: HashSet<String>,
    awaiting: bool,
    failed: bool,
}

impl ImageLoads {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn run(&self) -> u64 {
        self.run
    }

    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Forget everything if `run` is newer than the tracked run.
    pub fn sync_run(&mut self, run: u64) {
        if run != self.run {
            *self = Self { run, ..Self::default() };
        }
    }

    pub fn begin(&mut self, id: &str) {
        self.pending.insert(id.to_owned());
    }

    /// The engine asked to be told once every load finished. Returns true
    /// when it can be told right away.
    pub fn await_all(&mut self) -> bool {
        if self.failed {
            return false;
        }
        if self.pending.is_empty() {
            return true;
        }
        self.awaiting = true;
        false
    }

    /// Record one outcome reported under `run`.
    pub fn settle(&mut self, run: u64, id: &str, ok: bool) -> Settled {
        if run != self.run || !self.pending.remove(id) {
            return Settled::Stale;
        }
        if !ok {
            self.failed = true;
            self.awaiting = false;
            return Settled::Failed;
        }
        if self.awaiting && self.pending.is_empty() && !self.failed {
            self.awaiting = false;
            return Settled::BarrierReady;
        }
        Settled::Pending
    }
}
