//! # Index-addressed task outcome.
//!
//! A [`TaskResult`] is the slot reserved for one input. It starts **pending**
//! (neither `result` nor `error`) and is written exactly once when the task
//! settles. Slots of tasks that were never admitted (cancelled run) stay pending.
//!
//! ```text
//! pending ──settle(Ok)──► { result: Some(r), error: None }
//!         └─settle(Err)─► { result: None,    error: Some(e) }
//! ```

use crate::error::TaskError;

/// Outcome slot of the input at [`TaskResult::index`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult<R> {
    /// Zero-based input position.
    pub index: usize,
    /// Successful output, if the task succeeded.
    pub result: Option<R>,
    /// Final error after all attempts, if the task failed.
    pub error: Option<TaskError>,
    /// Attempts consumed (`0` while pending).
    pub attempts: u32,
}

impl<R> TaskResult<R> {
    /// Creates an empty slot for `index`.
    pub fn pending(index: usize) -> Self {
        Self {
            index,
            result: None,
            error: None,
            attempts: 0,
        }
    }

    /// Returns `true` once the slot holds a result or an error.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.result.is_some() || self.error.is_some()
    }

    /// Returns `true` if the task succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Returns `true` if the task failed after all attempts.
    #[inline]
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Writes the final outcome into the slot.
    pub(crate) fn settle(&mut self, outcome: Result<R, TaskError>, attempts: u32) {
        debug_assert!(!self.is_settled(), "slot {} settled twice", self.index);
        self.attempts = attempts;
        match outcome {
            Ok(value) => self.result = Some(value),
            Err(err) => self.error = Some(err),
        }
    }

    /// Converts the slot into `Some(Ok)`/`Some(Err)`, or `None` if pending.
    pub fn into_outcome(self) -> Option<Result<R, TaskError>> {
        match (self.result, self.error) {
            (Some(value), _) => Some(Ok(value)),
            (None, Some(err)) => Some(Err(err)),
            (None, None) => None,
        }
    }
}
