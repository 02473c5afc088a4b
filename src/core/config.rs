//! # Processor configuration.
//!
//! Provides [`ProcessorConfig`] centralized settings for a processor instance.
//! The config is immutable for the lifetime of the processor and shared
//! read-only by all of its runs.
//!
//! ## Clamping
//! - `max_concurrency = 0` → 1 (a scheduler that admits nothing never finishes)
//! - `progressive_threshold` → clamped to `[1, N]` per run
//! - `bus_capacity = 0` → 1
//!
//! ## Rejected values
//! - `timeout = Some(0s)` → [`ConfigError::ZeroTimeout`] (use `None` to disable)

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::RetryPolicy;

/// Configuration for a [`Processor`](crate::Processor).
///
/// ## Field semantics
/// - `max_concurrency`: cap on simultaneously in-flight tasks
/// - `retry_attempts`: retries after the first attempt (`0` = run once)
/// - `retry_delay`: fixed delay before each retry
/// - `progressive_threshold`: settled count that fires progressive readiness
/// - `timeout`: per-attempt timeout (`None` = unbounded)
/// - `bus_capacity`: event bus ring buffer size
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors, which
/// apply the clamping rules above.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Maximum number of tasks in flight at the same time.
    pub max_concurrency: usize,

    /// Retries allowed after a failed first attempt.
    pub retry_attempts: u32,

    /// Fixed delay between a failed attempt and the next one.
    pub retry_delay: Duration,

    /// Settled count at which `on_progressive_ready` fires (can be overridden per run).
    pub progressive_threshold: usize,

    /// Optional per-attempt timeout.
    pub timeout: Option<Duration>,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl ProcessorConfig {
    /// Checks the configuration for values that can never work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Returns the concurrency cap, clamped to at least 1.
    #[inline]
    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Returns the progressive threshold for a run over `total` inputs.
    ///
    /// `requested` overrides the configured value. The result is clamped to
    /// `[1, total]`; `None` means the callback can never fire (`total = 0`).
    pub fn threshold_for(&self, requested: Option<usize>, total: usize) -> Option<usize> {
        if total == 0 {
            return None;
        }
        let threshold = requested.unwrap_or(self.progressive_threshold);
        Some(threshold.clamp(1, total))
    }

    /// Returns the retry policy applied to every task.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            delay: self.retry_delay,
            timeout: self.timeout,
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ProcessorConfig {
    /// Default configuration:
    ///
    /// - `max_concurrency = 3`
    /// - `retry_attempts = 0` (run once)
    /// - `retry_delay = 0s`
    /// - `progressive_threshold = 3`
    /// - `timeout = None`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            retry_attempts: 0,
            retry_delay: Duration::ZERO,
            progressive_threshold: 3,
            timeout: None,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let cfg = ProcessorConfig {
            max_concurrency: 0,
            ..ProcessorConfig::default()
        };
        assert_eq!(cfg.concurrency_limit(), 1);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let cfg = ProcessorConfig {
            timeout: Some(Duration::ZERO),
            ..ProcessorConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
        assert!(ProcessorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_clamping() {
        let cfg = ProcessorConfig {
            progressive_threshold: 10,
            ..ProcessorConfig::default()
        };
        assert_eq!(cfg.threshold_for(None, 4), Some(4));
        assert_eq!(cfg.threshold_for(Some(0), 4), Some(1));
        assert_eq!(cfg.threshold_for(Some(2), 4), Some(2));
        assert_eq!(cfg.threshold_for(None, 0), None);
    }

    #[test]
    fn test_retry_policy_mirrors_config() {
        let cfg = ProcessorConfig {
            retry_attempts: 2,
            retry_delay: Duration::from_millis(50),
            timeout: Some(Duration::from_secs(1)),
            ..ProcessorConfig::default()
        };
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay, Duration::from_millis(50));
        assert_eq!(policy.attempt_timeout(), Some(Duration::from_secs(1)));
    }
}
