//! Progress reporting.
//!
//! The engine reports how far a run has got through [`ProgressObserver`]; how
//! that is rendered is up to the caller.

/// Units of work in one run. Progress is reported as a percentage.
pub const PROGRESS_TOTAL: u64 = 100;

/// Receives progress updates from a run.
///
/// `completed` never decreases during a run and never exceeds `total`.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, completed: u64, total: u64);
}

/// Observer that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _completed: u64, _total: u64) {}
}

/// Progress after `done` of `count` targets under the "all" scope: the targets
/// share the span from 60 to 99 evenly.
pub(crate) fn per_target(done: usize, count: usize) -> u64 {
    const START: u64 = 60;
    const SPAN: u64 = 39;

    if count == 0 {
        return START + SPAN;
    }
    START + SPAN * done as u64 / count as u64
}
