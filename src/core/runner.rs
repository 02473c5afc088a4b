//! # Run a single attempt of a task.
//!
//! Executes one attempt of a [`Work`] with optional timeout and publishes
//! failure events to the [`Bus`].
//!
//! - **Execute ONE attempt** (`work.spawn(input, index)`)
//! - **Apply timeout** if configured (wraps execution in `tokio::time::timeout`)
//! - **Isolate panics** (caught and turned into a retryable [`TaskError::Fail`])
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   work.spawn() → Ok(r)      → (no event, the settle is published by the processor)
//!
//! Failure:
//!   work.spawn() → Err(e)     → publish TaskFailed
//!
//! Panic:
//!   work.spawn() → panic      → publish TaskFailed (failed: panicked: ...)
//!
//! Timeout:
//!   timeout exceeded → drop attempt → publish TimeoutHit
//!                                   → publish TaskFailed (timeout)
//! ```
//!
//! ## Rules
//! - The timer belongs to the attempt: it is dropped as soon as the attempt settles
//! - On timeout the attempt's future is dropped (abandoned at its current suspension point)
//! - `TimeoutHit` is published **in addition to** `TaskFailed` on timeout

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::{
    error::{TaskError, panic_message},
    events::{Bus, Event, EventKind},
    tasks::Work,
};

/// Identifies the attempt for event publishing.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AttemptCtx {
    pub run: u64,
    pub index: usize,
    pub attempt: u32,
}

/// Executes a single attempt of `work`, publishing failure events to `bus`.
///
/// ### Timeout behavior
/// If `timeout` is `Some(dur)`:
/// - Wraps execution in `tokio::time::timeout`
/// - On timeout: publishes `TimeoutHit`, returns `Timeout` error
pub(crate) async fn run_once<T, R, W>(
    work: &W,
    input: T,
    timeout: Option<Duration>,
    ctx: AttemptCtx,
    bus: &Bus,
) -> Result<R, TaskError>
where
    W: Work<T, R> + ?Sized,
{
    let attempt = AssertUnwindSafe(async move { work.spawn(input, ctx.index).await })
        .catch_unwind()
        .map(|res| {
            res.unwrap_or_else(|panic| {
                Err(TaskError::Fail {
                    error: format!("panicked: {}", panic_message(panic.as_ref())),
                })
            })
        });

    let res = match timeout {
        Some(dur) => match time::timeout(dur, attempt).await {
            Ok(r) => r,
            Err(_elapsed) => {
                publish_timeout(bus, work.name(), dur, ctx);
                Err(TaskError::Timeout { timeout: dur })
            }
        },
        None => attempt.await,
    };

    if let Err(e) = &res {
        publish_failed(bus, work.name(), ctx, e);
    }
    res
}

/// Publishes `TaskFailed` event with error details.
fn publish_failed(bus: &Bus, name: &str, ctx: AttemptCtx, err: &TaskError) {
    bus.publish(
        Event::new(EventKind::TaskFailed)
            .with_run(ctx.run)
            .with_task(name)
            .with_index(ctx.index)
            .with_attempt(ctx.attempt)
            .with_reason(err.to_string()),
    );
}

/// Publishes `TimeoutHit` event (always followed by `TaskFailed`).
fn publish_timeout(bus: &Bus, name: &str, dur: Duration, ctx: AttemptCtx) {
    bus.publish(
        Event::new(EventKind::TimeoutHit)
            .with_run(ctx.run)
            .with_task(name)
            .with_index(ctx.index)
            .with_timeout(dur)
            .with_attempt(ctx.attempt),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::WorkFn;

    fn ctx() -> AttemptCtx {
        AttemptCtx {
            run: 1,
            index: 0,
            attempt: 1,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_publishes_hit_and_failure() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let work = WorkFn::new("slow", |_: (), _index: usize| async move {
            time::sleep(Duration::from_secs(10)).await;
            Ok::<_, TaskError>(())
        });

        let res = run_once(&work, (), Some(Duration::from_millis(100)), ctx(), &bus).await;
        assert_eq!(
            res,
            Err(TaskError::Timeout {
                timeout: Duration::from_millis(100)
            })
        );

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TimeoutHit);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TaskFailed);
        assert_eq!(failed.index, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_attempt_beats_timeout() {
        let bus = Bus::new(16);
        let work = WorkFn::new("fast", |x: u32, _index: usize| async move {
            time::sleep(Duration::from_millis(10)).await;
            Ok::<_, TaskError>(x + 1)
        });

        let res = run_once(&work, 41, Some(Duration::from_secs(1)), ctx(), &bus).await;
        assert_eq!(res, Ok(42));
    }

    #[tokio::test]
    async fn test_panic_becomes_retryable_failure() {
        let bus = Bus::new(16);
        let work = WorkFn::new("boom", |_: (), _index: usize| async move {
            if true {
                panic!("kaboom");
            }
            Ok::<(), TaskError>(())
        });

        let mut rx = bus.subscribe();
        let res = run_once(&work, (), None, ctx(), &bus).await;
        assert_eq!(res, Err(TaskError::fail("panicked: kaboom")));
        assert!(res.unwrap_err().is_retryable());

        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TaskFailed);
        assert_eq!(failed.reason.as_deref(), Some("failed: panicked: kaboom"));
    }
}
