//! Retry policies.
//!
//! This module groups the knobs that control **if/when** a failed task is tried
//! again and **how long** each attempt may run.
//!
//! ## Contents
//! - [`RetryPolicy`] retries after the first attempt, fixed delay, per-attempt timeout
//!
//! ## Quick wiring
//! ```text
//! ProcessorConfig { retry_attempts, retry_delay, timeout }
//!      └─► ProcessorConfig::retry_policy() ─► RetryPolicy
//!           └─► core::actor::TaskActor uses:
//!                - allows_retry(attempts_made, err) to decide retry/settle
//!                - delay to sleep between attempts
//!                - attempt_timeout() to bound each attempt
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → attempts=0, delay=0, timeout=None (run once).

mod retry;

pub use retry::RetryPolicy;
