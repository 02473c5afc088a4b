//! # Retry policy for a single task.
//!
//! [`RetryPolicy`] decides whether a failed attempt gets another try and how long
//! to wait before it. It is parameterized by:
//! - [`RetryPolicy::attempts`] the number of retries after the first attempt;
//! - [`RetryPolicy::delay`] the fixed delay between attempts (no growth);
//! - [`RetryPolicy::timeout`] the optional per-attempt timeout.
//!
//! A task is therefore invoked at most `attempts + 1` times.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{RetryPolicy, TaskError};
//!
//! let policy = RetryPolicy {
//!     attempts: 2,
//!     delay: Duration::from_millis(100),
//!     timeout: None,
//! };
//!
//! let err = TaskError::fail("boom");
//! assert!(policy.allows_retry(1, &err));
//! assert!(policy.allows_retry(2, &err));
//! assert!(!policy.allows_retry(3, &err));
//! assert_eq!(policy.max_attempts(), 3);
//! ```

use std::time::Duration;

use crate::error::TaskError;

/// Fixed-delay retry policy with an optional per-attempt timeout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt (`0` = run once).
    pub attempts: u32,
    /// Delay before each retry.
    pub delay: Duration,
    /// Per-attempt timeout (`None` = no timeout).
    pub timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Policy that runs every task exactly once, without timeout.
    pub const fn once() -> Self {
        Self {
            attempts: 0,
            delay: Duration::ZERO,
            timeout: None,
        }
    }

    /// Total number of attempts a task may consume.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.attempts.saturating_add(1)
    }

    /// Returns `true` if another attempt should follow a failure.
    ///
    /// `attempts_made` counts attempts already executed (1 after the first one).
    /// Non-retryable errors ([`TaskError::Fatal`]) always stop the task.
    pub fn allows_retry(&self, attempts_made: u32, err: &TaskError) -> bool {
        err.is_retryable() && attempts_made < self.max_attempts()
    }

    /// Timeout applied to each attempt, ignoring a zero duration.
    #[inline]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|d| *d > Duration::ZERO)
    }
}
