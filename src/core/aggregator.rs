//! # Result aggregation.
//!
//! [`ResultAggregator`] owns the pre-sized, index-addressed result array of a
//! run. Writes go to `slots[index]`, never appended, so the output order is the
//! input order no matter which task settles first.

use std::sync::Arc;

use crate::core::state::RunState;
use crate::error::TaskError;
use crate::tasks::TaskResult;

/// Fixed-size result array plus the run's success/failure counters.
pub(crate) struct ResultAggregator<R> {
    slots: Vec<TaskResult<R>>,
    settled: usize,
    state: Arc<RunState>,
}

impl<R> ResultAggregator<R> {
    /// Pre-sizes `state.total()` pending slots.
    pub fn new(state: Arc<RunState>) -> Self {
        let slots = (0..state.total()).map(TaskResult::pending).collect();
        Self {
            slots,
            settled: 0,
            state,
        }
    }

    /// Writes the outcome of the task at `index` and returns the new settled count.
    pub fn record(&mut self, index: usize, outcome: Result<R, TaskError>, attempts: u32) -> usize {
        let success = outcome.is_ok();
        self.slots[index].settle(outcome, attempts);
        self.state.task_settled(success);
        self.settled += 1;
        self.settled
    }

    /// Settled slot count.
    #[inline]
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Current view of all slots (pending ones included).
    #[inline]
    pub fn snapshot(&self) -> &[TaskResult<R>] {
        &self.slots
    }

    pub fn into_results(self) -> Vec<TaskResult<R>> {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_writes_land_in_place() {
        let state = Arc::new(RunState::new(1, 3, None));
        for _ in 0..3 {
            state.task_admitted();
        }
        let mut agg = ResultAggregator::new(state.clone());

        assert_eq!(agg.record(2, Ok("c"), 1), 1);
        assert_eq!(agg.record(0, Err(TaskError::fail("a")), 2), 2);
        assert!(!agg.snapshot()[1].is_settled());
        assert_eq!(agg.record(1, Ok("b"), 1), 3);

        let stats = state.stats();
        assert_eq!((stats.success_count, stats.failure_count), (2, 1));
        assert_eq!(stats.active_tasks, 0);

        let results = agg.into_results();
        let indices: Vec<_> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(results[2].result, Some("c"));
        assert_eq!(results[0].attempts, 2);
    }
}
