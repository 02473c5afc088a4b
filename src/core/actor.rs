//! # TaskActor: retry loop for a single task.
//!
//! Supervises execution of one [`Task`] with a [`RetryPolicy`]:
//! - fixed delay between attempts,
//! - optional per-attempt timeout,
//! - at most `attempts + 1` attempts, fewer if the error is not retryable.
//!
//! ## Event flow
//! For each attempt, the actor (and the runner) publish:
//! ```text
//! TaskStarting → [attempt] → (success: no event)
//!                          → TimeoutHit + TaskFailed (timeout)
//!                          → TaskFailed (error)
//!
//! If retry allowed:
//!   → RetryScheduled → [sleep(delay)] → next attempt
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** within one actor (never parallel)
//! - `attempts_used` **increments on each attempt** and is reported with the outcome
//! - Cancellation of the run does **not** interrupt an actor: admitted tasks run to
//!   completion, retries included

use std::sync::Arc;

use tokio::time;

use crate::{
    core::runner::{AttemptCtx, run_once},
    error::TaskError,
    events::{Bus, Event, EventKind},
    policies::RetryPolicy,
    tasks::{Task, Work},
};

/// Final outcome of one task, posted back to the scheduler.
pub(crate) struct Settled<R> {
    pub index: usize,
    pub attempts: u32,
    pub outcome: Result<R, TaskError>,
}

/// Runs a single [`Task`] through its attempts.
pub(crate) struct TaskActor<W> {
    /// Unit of work shared by every task of the run.
    pub work: Arc<W>,
    /// Retry/timeout policy.
    pub retry: RetryPolicy,
    /// Internal event bus.
    pub bus: Bus,
    /// Run identifier for events.
    pub run: u64,
}

impl<W> TaskActor<W> {
    pub fn new(work: Arc<W>, retry: RetryPolicy, bus: Bus, run: u64) -> Self {
        Self {
            work,
            retry,
            bus,
            run,
        }
    }

    /// Runs attempts until success, a non-retryable error, or retry exhaustion.
    ///
    /// ### Flow
    /// 1. `attempts_used += 1`, publish `TaskStarting`
    /// 2. Execute one attempt via `run_once` (timeout applied there)
    /// 3. On success return immediately
    /// 4. On failure consult the policy; if allowed publish `RetryScheduled`,
    ///    sleep the fixed delay and go to 1, else return the last error
    pub async fn run<T, R>(self, mut task: Task<T>) -> Settled<R>
    where
        T: Clone,
        W: Work<T, R>,
    {
        let work: &W = &self.work;
        let timeout = self.retry.attempt_timeout();

        loop {
            task.attempts_used += 1;
            let ctx = AttemptCtx {
                run: self.run,
                index: task.index,
                attempt: task.attempts_used,
            };
            self.bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_run(self.run)
                    .with_task(work.name())
                    .with_index(task.index)
                    .with_attempt(task.attempts_used),
            );

            let res = run_once(work, task.input.clone(), timeout, ctx, &self.bus).await;

            match res {
                Ok(value) => {
                    return Settled {
                        index: task.index,
                        attempts: task.attempts_used,
                        outcome: Ok(value),
                    };
                }
                Err(e) => {
                    if !self.retry.allows_retry(task.attempts_used, &e) {
                        return Settled {
                            index: task.index,
                            attempts: task.attempts_used,
                            outcome: Err(e),
                        };
                    }

                    self.bus.publish(
                        Event::new(EventKind::RetryScheduled)
                            .with_run(self.run)
                            .with_task(work.name())
                            .with_index(task.index)
                            .with_delay(self.retry.delay)
                            .with_attempt(task.attempts_used)
                            .with_reason(e.to_string()),
                    );
                    if !self.retry.delay.is_zero() {
                        time::sleep(self.retry.delay).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::WorkFn;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn policy(attempts: u32, delay_ms: u64) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::from_millis(delay_ms),
            timeout: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_all_attempts_then_fails() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let work = Arc::new(WorkFn::new("always-fails", move |_: (), index: usize| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TaskError::fail(format!("item {index} failed")))
            }
        }));

        let actor = TaskActor::new(work, policy(2, 100), Bus::new(16), 1);
        let started = time::Instant::now();
        let settled = actor.run(Task::new(5, ())).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(settled.index, 5);
        assert_eq!(settled.attempts, 3);
        assert_eq!(settled.outcome, Err(TaskError::fail("item 5 failed")));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(250), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let work = Arc::new(WorkFn::new("flaky", move |x: u32, _index: usize| {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TaskError::fail("first attempt fails"))
                } else {
                    Ok(x * 10)
                }
            }
        }));

        let actor = TaskActor::new(work, policy(3, 10), Bus::new(16), 1);
        let settled = actor.run(Task::new(0, 4)).await;

        assert_eq!(settled.outcome, Ok(40));
        assert_eq!(settled.attempts, 2);
    }

    #[tokio::test]
    async fn test_fatal_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let work = Arc::new(WorkFn::new("fatal", move |_: (), _index: usize| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TaskError::fatal("bad input"))
            }
        }));

        let actor = TaskActor::new(work, policy(5, 0), Bus::new(16), 1);
        let settled = actor.run(Task::new(0, ())).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(settled.outcome, Err(TaskError::fatal("bad input")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_feed_the_retry_path() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let work = Arc::new(WorkFn::new("hangs", |_: (), _index: usize| async move {
            time::sleep(Duration::from_secs(60)).await;
            Ok::<_, TaskError>(())
        }));
        let retry = RetryPolicy {
            attempts: 1,
            delay: Duration::from_millis(5),
            timeout: Some(Duration::from_millis(50)),
        };

        let settled = TaskActor::new(work, retry, bus, 9).run(Task::new(2, ())).await;
        assert_eq!(settled.attempts, 2);
        assert_eq!(
            settled.outcome,
            Err(TaskError::Timeout {
                timeout: Duration::from_millis(50)
            })
        );

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.run, Some(9));
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskStarting,
                EventKind::TimeoutHit,
                EventKind::TaskFailed,
                EventKind::RetryScheduled,
                EventKind::TaskStarting,
                EventKind::TimeoutHit,
                EventKind::TaskFailed,
            ]
        );
    }
}
