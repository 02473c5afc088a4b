//! # Per-run state and statistics.
//!
//! [`RunState`] is created by each `process_parallel` invocation and shared
//! (via `Arc`) with the owning [`Processor`](crate::Processor) so that
//! `cancel()` and `stats()` can reach the run from other tasks.
//!
//! ## Rules
//! - Counters are written **only** by the scheduler loop of the owning run
//! - Readers (`stats`) are **eventually consistent** (each counter is read separately)
//! - The cancellation token is the advisory flag: once cancelled, nothing new is admitted
//!
//! ## Phases
//! ```text
//! Idle ──► Running ──► (Cancelling) ──► Completed
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// No run has started on this processor yet.
    #[default]
    Idle,
    /// Tasks are being admitted and awaited.
    Running,
    /// Cancellation requested; in-flight tasks are still awaited.
    Cancelling,
    /// Nothing in flight and nothing more to admit; counters are final.
    Completed,
}

/// Snapshot of run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    /// Number of inputs in the run.
    pub total_tasks: usize,
    /// Settled slots holding a result.
    pub success_count: usize,
    /// Settled slots holding an error.
    pub failure_count: usize,
    /// `success_count / total_tasks * 100` (`0` for an empty run).
    pub success_rate: f64,
    /// Tasks admitted and not yet settled.
    pub active_tasks: usize,
    /// Current phase of the run.
    pub phase: RunPhase,
}

impl Stats {
    /// Settled task count (`success_count + failure_count`).
    #[inline]
    pub fn settled(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// Live state of one run.
#[derive(Debug)]
pub(crate) struct RunState {
    id: u64,
    total: usize,
    token: CancellationToken,
    active: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    completed: AtomicBool,
}

impl RunState {
    /// Creates the state for run `id` over `total` inputs.
    ///
    /// With a `parent` token the run's flag is a child of it, so cancelling the
    /// parent also stops admission (but cancelling the run leaves the parent alone).
    pub fn new(id: u64, total: usize, parent: Option<&CancellationToken>) -> Self {
        let token = match parent {
            Some(p) => p.child_token(),
            None => CancellationToken::new(),
        };
        Self {
            id,
            total,
            token,
            active: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            completed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Sets the advisory cancellation flag. Returns `false` if it was already set.
    pub fn cancel(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        true
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    pub fn task_admitted(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a settle: the task leaves the active set and one counter grows.
    pub fn task_settled(&self, success: bool) {
        if success {
            self.succeeded.fetch_add(1, Ordering::AcqRel);
        } else {
            self.failed.fetch_add(1, Ordering::AcqRel);
        }
        self.active.fetch_sub(1, Ordering::AcqRel);
    }

    /// The task was aborted by the runtime and will never settle.
    pub fn task_lost(&self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn mark_completed(&self) {
        self.completed.store(true, Ordering::Release);
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> Stats {
        let success_count = self.succeeded.load(Ordering::Acquire);
        let failure_count = self.failed.load(Ordering::Acquire);
        let success_rate = if self.total == 0 {
            0.0
        } else {
            success_count as f64 / self.total as f64 * 100.0
        };
        let phase = if self.is_completed() {
            RunPhase::Completed
        } else if self.is_cancelled() {
            RunPhase::Cancelling
        } else {
            RunPhase::Running
        };

        Stats {
            total_tasks: self.total,
            success_count,
            failure_count,
            success_rate,
            active_tasks: self.active.load(Ordering::Acquire),
            phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run_has_zero_rate() {
        let state = RunState::new(1, 0, None);
        state.mark_completed();
        let stats = state.stats();
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.phase, RunPhase::Completed);
    }

    #[test]
    fn test_counters_and_rate() {
        let state = RunState::new(1, 4, None);
        for _ in 0..4 {
            state.task_admitted();
        }
        state.task_settled(true);
        state.task_settled(true);
        state.task_settled(false);

        let stats = state.stats();
        assert_eq!(stats.active_tasks, 1);
        assert_eq!(stats.settled(), 3);
        assert_eq!(stats.success_rate, 50.0);
        assert_eq!(stats.phase, RunPhase::Running);
    }

    #[test]
    fn test_cancel_is_idempotent_and_sets_phase() {
        let state = RunState::new(1, 2, None);
        assert!(state.cancel());
        assert!(!state.cancel());
        assert_eq!(state.stats().phase, RunPhase::Cancelling);
    }

    #[test]
    fn test_parent_token_cancels_run() {
        let parent = CancellationToken::new();
        let state = RunState::new(1, 2, Some(&parent));
        parent.cancel();
        assert!(state.is_cancelled());

        let parent = CancellationToken::new();
        let state = RunState::new(2, 2, Some(&parent));
        state.cancel();
        assert!(!parent.is_cancelled());
    }
}
