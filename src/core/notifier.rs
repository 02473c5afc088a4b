//! # Progress notification.
//!
//! [`ProgressNotifier`] is driven by the scheduler after every settle:
//! - `on_progress(settled, total)` fires on **every** settle
//! - `on_progressive_ready(&slots)` fires **once**, the first time
//!   `settled >= threshold`
//!
//! The progressive callback is an `FnOnce` taken out of its `Option` when it
//! fires, so it cannot run twice within a run.

use crate::core::options::{ProgressFn, ProgressiveFn};
use crate::tasks::TaskResult;

pub(crate) struct ProgressNotifier<R> {
    on_progress: Option<ProgressFn>,
    on_progressive_ready: Option<ProgressiveFn<R>>,
    threshold: Option<usize>,
    fired: bool,
}

impl<R> ProgressNotifier<R> {
    /// `threshold = None` disables progressive readiness (empty run).
    pub fn new(
        on_progress: Option<ProgressFn>,
        on_progressive_ready: Option<ProgressiveFn<R>>,
        threshold: Option<usize>,
    ) -> Self {
        Self {
            on_progress,
            on_progressive_ready,
            threshold,
            fired: false,
        }
    }

    /// Handles one settle. Returns `true` if progressive readiness was reached by it.
    pub fn on_settle(&mut self, settled: usize, total: usize, slots: &[TaskResult<R>]) -> bool {
        if let Some(f) = self.on_progress.as_mut() {
            f(settled, total);
        }

        let Some(threshold) = self.threshold else {
            return false;
        };
        if self.fired || settled < threshold {
            return false;
        }

        self.fired = true;
        if let Some(f) = self.on_progressive_ready.take() {
            f(slots);
        }
        true
    }
}
