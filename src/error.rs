//! Errors of the processor and of individual attempts.
//!
//! [`ConfigError`] rejects an unusable [`ProcessorConfig`](crate::ProcessorConfig)
//! before any run starts. [`TaskError`] describes why one attempt failed and is
//! stored per slot; it never fails `process_parallel` as a whole.

use std::any::Any;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced when building a processor.
///
/// Only construction-time misuse fails a call as a whole; per-task failures are
/// always reported as data inside [`TaskResult`](crate::TaskResult).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A per-attempt timeout of zero would fail every attempt before it starts.
    #[error("timeout must be greater than zero (use None to disable)")]
    ZeroTimeout,
}

impl ConfigError {
    /// Stable snake_case label for log fields.
    ///
    /// ```
    /// use batchvisor::ConfigError;
    ///
    /// assert_eq!(ConfigError::ZeroTimeout.as_label(), "config_zero_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroTimeout => "config_zero_timeout",
        }
    }

    /// Returns a human-readable explanation of the rejected setting.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::ZeroTimeout => "timeout: zero is not a usable attempt timeout".to_string(),
        }
    }
}

/// Coarse classification of a task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The unit of work rejected, returned an error or panicked.
    Processing,
    /// An attempt exceeded the configured timeout.
    Timeout,
}

/// Failure of one attempt of the unit of work.
///
/// The last error of a task ends up in its [`TaskResult`](crate::TaskResult).
/// `Fail` and `Timeout` go through the retry policy; `Fatal` settles the task at once.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The attempt did not finish within the per-attempt timeout.
    #[error("attempt timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The work rejected the input for good (returned via [`TaskError::fatal`]).
    #[error("fatal: {error}")]
    Fatal { error: String },

    /// The work failed or panicked; another attempt may succeed.
    #[error("failed: {error}")]
    Fail { error: String },
}

impl TaskError {
    /// Builds a retryable [`TaskError::Fail`].
    ///
    /// ```
    /// use batchvisor::TaskError;
    ///
    /// let err = TaskError::fail("connection reset");
    /// assert!(err.is_retryable());
    /// assert_eq!(err.to_string(), "failed: connection reset");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Builds a non-retryable [`TaskError::Fatal`].
    pub fn fatal(error: impl std::fmt::Display) -> Self {
        TaskError::Fatal {
            error: error.to_string(),
        }
    }

    /// Stable snake_case label for log fields.
    ///
    /// ```
    /// use batchvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
        }
    }

    /// Short message without the variant prefix noise of `Display`.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
        }
    }

    /// Coarse classification: [`ErrorKind::Timeout`] for timeouts, [`ErrorKind::Processing`] otherwise.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::Timeout { .. } => ErrorKind::Timeout,
            TaskError::Fatal { .. } | TaskError::Fail { .. } => ErrorKind::Processing,
        }
    }

    /// `true` unless the error is [`TaskError::Fatal`].
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TaskError::Fatal { .. })
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
