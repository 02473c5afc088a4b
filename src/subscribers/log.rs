//! # Logging subscriber built on `tracing`.
//!
//! [`LogWriter`] renders runtime events as `tracing` records. Install any
//! `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Output format
//! ```text
//! [run-started] run=1 work=resize total=10
//! [starting] run=1 work=resize index=3 attempt=1
//! [failed] run=1 work=resize index=3 attempt=1 err="connection refused"
//! [retry] run=1 work=resize index=3 delay_ms=200 after_attempt=1
//! [timeout] run=1 work=resize index=4 timeout_ms=5000
//! [settled] run=1 work=resize index=3 attempts=2 progress=4/10
//! [progressive-ready] run=1 progress=5/10
//! [cancel-requested] run=1 progress=6/10
//! [run-completed] run=1 progress=10/10
//! ```
//!
//! Attempt-level events are emitted at `debug`, run-level events at `info`,
//! failures and subscriber problems at `warn`.

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Subscriber that forwards events to `tracing`.
///
/// Enabled via the `logging` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let run = e.run.unwrap_or_default();
        let work = e.task.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::RunStarted => {
                tracing::info!("[run-started] run={run} work={work} total={:?}", e.total);
            }
            EventKind::TaskStarting => {
                tracing::debug!(
                    "[starting] run={run} work={work} index={:?} attempt={:?}",
                    e.index,
                    e.attempt
                );
            }
            EventKind::TaskFailed => {
                tracing::warn!(
                    "[failed] run={run} work={work} index={:?} attempt={:?} err={:?}",
                    e.index,
                    e.attempt,
                    e.reason
                );
            }
            EventKind::TimeoutHit => {
                tracing::warn!(
                    "[timeout] run={run} work={work} index={:?} timeout_ms={:?}",
                    e.index,
                    e.timeout_ms
                );
            }
            EventKind::RetryScheduled => {
                tracing::debug!(
                    "[retry] run={run} work={work} index={:?} delay_ms={:?} after_attempt={:?}",
                    e.index,
                    e.delay_ms,
                    e.attempt
                );
            }
            EventKind::TaskSettled => {
                tracing::debug!(
                    "[settled] run={run} work={work} index={:?} attempts={:?} progress={}",
                    e.index,
                    e.attempt,
                    progress(e)
                );
            }
            EventKind::ProgressiveReady => {
                tracing::info!("[progressive-ready] run={run} progress={}", progress(e));
            }
            EventKind::CancelRequested => {
                tracing::info!("[cancel-requested] run={run} progress={}", progress(e));
            }
            EventKind::RunCompleted => {
                tracing::info!("[run-completed] run={run} progress={}", progress(e));
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                tracing::warn!("[subscriber] name={work} reason={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

fn progress(e: &Event) -> String {
    match (e.settled, e.total) {
        (Some(s), Some(t)) => format!("{s}/{t}"),
        _ => "-".to_string(),
    }
}
