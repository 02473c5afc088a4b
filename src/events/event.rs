//! # Runtime events emitted by the processor and task actors.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: batch lifecycle (started, progressive readiness, cancel, completed)
//! - **Task events**: per-attempt flow (starting, failed, timeout, retry) and final settle
//! - **Subscriber events**: delivery problems inside the subscriber fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, run id,
//! task index, attempt numbers, reasons and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("resize")
//!     .with_index(3)
//!     .with_reason("boom")
//!     .with_attempt(2)
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("resize"));
//! assert_eq!(ev.index, Some(3));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Run events ===
    /// A batch run started.
    ///
    /// Sets:
    /// - `run`: run id
    /// - `task`: work name
    /// - `total`: number of inputs
    RunStarted,

    /// Settled count reached the progressive threshold (once per run).
    ///
    /// Sets:
    /// - `run`, `task`
    /// - `settled`, `total`
    ProgressiveReady,

    /// Advisory cancellation was requested; no further tasks are admitted.
    ///
    /// Sets:
    /// - `run`
    /// - `settled`, `total` at the moment of the request
    CancelRequested,

    /// The run finished: nothing in flight and nothing more to admit.
    ///
    /// Sets:
    /// - `run`, `task`
    /// - `settled`, `total`
    /// - `reason`: `"cancelled"` if admission stopped early
    RunCompleted,

    // === Task events ===
    /// Task is starting an attempt.
    ///
    /// Sets:
    /// - `run`, `task`, `index`
    /// - `attempt`: attempt number (1-based, per task)
    TaskStarting,

    /// An attempt failed (including timeouts).
    ///
    /// Sets:
    /// - `run`, `task`, `index`, `attempt`
    /// - `reason`: failure message
    TaskFailed,

    /// An attempt exceeded its configured timeout (always followed by `TaskFailed`).
    ///
    /// Sets:
    /// - `run`, `task`, `index`, `attempt`
    /// - `timeout_ms`: configured attempt timeout (ms)
    TimeoutHit,

    /// Next attempt scheduled after a failure.
    ///
    /// Sets:
    /// - `run`, `task`, `index`
    /// - `attempt`: failed attempt number
    /// - `delay_ms`: delay before the next attempt (ms)
    /// - `reason`: last failure message
    RetryScheduled,

    /// Task reached its final outcome and its slot was written.
    ///
    /// Sets:
    /// - `run`, `task`, `index`
    /// - `attempt`: attempts consumed
    /// - `reason`: final error (absent on success)
    /// - `settled`, `total`
    TaskSettled,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Run identifier (unique per processor).
    pub run: Option<u64>,
    /// Name of the unit of work (or subscriber, for subscriber events).
    pub task: Option<Arc<str>>,
    /// Input index of the task, if applicable.
    pub index: Option<usize>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Attempt timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Settled task count at the time of the event.
    pub settled: Option<usize>,
    /// Total task count of the run.
    pub total: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            run: None,
            task: None,
            index: None,
            attempt: None,
            timeout_ms: None,
            delay_ms: None,
            reason: None,
            settled: None,
            total: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task (work) name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a run id.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches an input index.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches an attempt timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches run progress (`settled` out of `total`).
    #[inline]
    pub fn with_progress(mut self, settled: usize, total: usize) -> Self {
        self.settled = Some(settled);
        self.total = Some(total);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_durations_are_clamped() {
        let ev = Event::new(EventKind::RetryScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_progress_fields() {
        let ev = Event::new(EventKind::TaskSettled).with_progress(2, 5);
        assert_eq!((ev.settled, ev.total), (Some(2), Some(5)));
    }
}
