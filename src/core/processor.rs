//! # Processor: bounded-concurrency batch scheduler.
//!
//! The [`Processor`] owns an immutable [`ProcessorConfig`], the event bus and
//! a handle to its most recent run. Each [`Processor::process_parallel`] call
//! creates its own run state, so concurrent calls never interfere.
//!
//! ## Key responsibilities
//! - admit tasks up to `max_concurrency`, refilling as tasks settle
//! - run every task through a retry actor (fixed delay, per-attempt timeout)
//! - write each outcome into its index-addressed slot
//! - fire progress / progressive-readiness callbacks in settle order
//! - stop admitting on advisory cancellation
//!
//! ## High-level architecture
//! ```text
//! process_parallel(items, work, options)
//!
//! Preparation:
//!   - RunState (id, total, cancellation token, counters) ─► Processor::current
//!   - ResultAggregator (N pending slots), ProgressNotifier (threshold clamped to [1, N])
//!   - queue = [(0, item0), (1, item1), ... (N-1, itemN-1)]
//!
//! Scheduler loop (sole mutator of queue, slots and progressive flag):
//!   loop {
//!     ├─► while in_flight < cap && !cancelled && queue non-empty:
//!     │       JoinSet.spawn(TaskActor::run(Task { index, input }))
//!     ├─► join_next()  (completion queue; None → nothing in flight → exit)
//!     ├─► aggregator.record(index, outcome)         ─► publish TaskSettled
//!     └─► notifier.on_settle(settled, total, slots) ─► publish ProgressiveReady (once)
//!   }
//!   publish RunCompleted, mark run completed, return slots
//! ```
//!
//! ## Example
//! ```rust
//! use batchvisor::{Processor, ProcessorConfig, RunOptions, TaskError, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = Processor::new(ProcessorConfig {
//!         max_concurrency: 2,
//!         retry_attempts: 1,
//!         ..ProcessorConfig::default()
//!     })?;
//!
//!     let work = WorkFn::new("len", |word: &'static str, index: usize| async move {
//!         if word.is_empty() {
//!             return Err(TaskError::fatal(format!("empty word at {index}")));
//!         }
//!         Ok(word.len())
//!     });
//!
//!     let results = processor
//!         .process_parallel(vec!["alpha", "", "gamma"], work, RunOptions::new())
//!         .await;
//!
//!     assert_eq!(results[0].result, Some(5));
//!     assert!(results[1].error.is_some());
//!     assert_eq!(processor.stats().success_count, 2);
//!     Ok(())
//! }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::core::{
    actor::{Settled, TaskActor},
    aggregator::ResultAggregator,
    builder::ProcessorBuilder,
    config::ProcessorConfig,
    notifier::ProgressNotifier,
    options::RunOptions,
    state::{RunState, Stats},
};
use crate::{
    error::ConfigError,
    events::{Bus, Event, EventKind},
    tasks::{Task, TaskResult, Work},
};

/// Runs batches of independent async work under a concurrency cap.
pub struct Processor {
    cfg: ProcessorConfig,
    bus: Bus,
    current: RwLock<Option<Arc<RunState>>>,
    next_run: AtomicU64,
    listener_token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Processor {
    /// Creates a processor without subscribers.
    ///
    /// Fails only if the configuration is unusable (see [`ProcessorConfig::validate`]).
    pub fn new(cfg: ProcessorConfig) -> Result<Self, ConfigError> {
        ProcessorBuilder::new(cfg).build()
    }

    /// Returns a builder to attach subscribers.
    pub fn builder(cfg: ProcessorConfig) -> ProcessorBuilder {
        ProcessorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: ProcessorConfig,
        bus: Bus,
        listener_token: CancellationToken,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            cfg,
            bus,
            current: RwLock::new(None),
            next_run: AtomicU64::new(1),
            listener_token,
            listener: Mutex::new(listener),
        }
    }

    /// Returns the immutable configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.cfg
    }

    /// Creates a receiver for all subsequent runtime events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs `work` over every item with at most `max_concurrency` tasks in flight.
    ///
    /// Returns one [`TaskResult`] per input, in input order. Task failures are
    /// reported inside the slots, never as an error of the call.
    ///
    /// ### Rules
    /// - Slot `i` always corresponds to `items[i]`, whatever the completion order
    /// - Each task is tried at most `retry_attempts + 1` times
    /// - After [`cancel`](Self::cancel) no new task is admitted; admitted tasks finish
    ///   and are recorded, never-admitted slots stay pending
    /// - Callbacks run on the scheduler, in settle order
    pub async fn process_parallel<T, R, W>(
        &self,
        items: Vec<T>,
        work: W,
        options: RunOptions<R>,
    ) -> Vec<TaskResult<R>>
    where
        T: Clone + Send + 'static,
        R: Send + 'static,
        W: Work<T, R>,
    {
        let RunOptions {
            on_progress,
            on_progressive_ready,
            progressive_threshold,
            cancel,
        } = options;

        let total = items.len();
        let run_id = self.next_run.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(RunState::new(run_id, total, cancel.as_ref()));
        self.set_current(Arc::clone(&state));

        let name: Arc<str> = work.name().into();
        let work = Arc::new(work);
        let limit = self.cfg.concurrency_limit();
        let retry = self.cfg.retry_policy();

        self.bus.publish(
            Event::new(EventKind::RunStarted)
                .with_run(run_id)
                .with_task(Arc::clone(&name))
                .with_progress(0, total),
        );

        let mut aggregator = ResultAggregator::new(Arc::clone(&state));
        let mut notifier = ProgressNotifier::new(
            on_progress,
            on_progressive_ready,
            self.cfg.threshold_for(progressive_threshold, total),
        );
        let mut queue: VecDeque<(usize, T)> = items.into_iter().enumerate().collect();
        let mut in_flight: JoinSet<Settled<R>> = JoinSet::new();

        loop {
            while in_flight.len() < limit && !state.is_cancelled() {
                let Some((index, input)) = queue.pop_front() else {
                    break;
                };
                state.task_admitted();
                let actor = TaskActor::new(Arc::clone(&work), retry, self.bus.clone(), run_id);
                in_flight.spawn(actor.run(Task::new(index, input)));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let Settled {
                index,
                attempts,
                outcome,
            } = match joined {
                Ok(settled) => settled,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    tracing::warn!(run = run_id, error = %e, "task aborted before settling");
                    state.task_lost();
                    continue;
                }
            };

            let reason = outcome.as_ref().err().map(ToString::to_string);
            let settled = aggregator.record(index, outcome, attempts);

            let mut ev = Event::new(EventKind::TaskSettled)
                .with_run(run_id)
                .with_task(Arc::clone(&name))
                .with_index(index)
                .with_attempt(attempts)
                .with_progress(settled, total);
            if let Some(reason) = reason {
                ev = ev.with_reason(reason);
            }
            self.bus.publish(ev);

            if notifier.on_settle(settled, total, aggregator.snapshot()) {
                self.bus.publish(
                    Event::new(EventKind::ProgressiveReady)
                        .with_run(run_id)
                        .with_task(Arc::clone(&name))
                        .with_progress(settled, total),
                );
            }
        }

        state.mark_completed();
        let mut done = Event::new(EventKind::RunCompleted)
            .with_run(run_id)
            .with_task(name)
            .with_progress(aggregator.settled(), total);
        if state.is_cancelled() && aggregator.settled() < total {
            done = done.with_reason("cancelled");
        }
        self.bus.publish(done);

        aggregator.into_results()
    }

    /// Requests advisory cancellation of the current run.
    ///
    /// No further tasks are admitted; tasks already in flight run to completion
    /// and their results are recorded. Has no effect if no run was started.
    pub fn cancel(&self) {
        let Some(state) = self.current() else {
            return;
        };
        if state.cancel() {
            let stats = state.stats();
            self.bus.publish(
                Event::new(EventKind::CancelRequested)
                    .with_run(state.id())
                    .with_progress(stats.settled(), stats.total_tasks),
            );
        }
    }

    /// Returns statistics of the current (most recently started) run.
    ///
    /// Valid mid-run; final once the run's phase is `Completed`.
    pub fn stats(&self) -> Stats {
        self.current()
            .map(|state| state.stats())
            .unwrap_or_default()
    }

    /// Stops the subscriber listener after delivering already published events.
    pub async fn shutdown(&self) {
        self.listener_token.cancel();
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn current(&self) -> Option<Arc<RunState>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, state: Arc<RunState>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        self.listener_token.cancel();
    }
}

/// Runs `work` over `items` with a one-off processor and keeps only successes.
///
/// **Lossy**: failed inputs are dropped, so the output may be shorter than
/// `items` and is no longer index-aligned with it. Use
/// [`Processor::process_parallel`] when failures matter.
///
/// # Example
/// ```rust
/// use batchvisor::{ProcessorConfig, TaskError, WorkFn, process_in_parallel};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let parse = WorkFn::new("parse", |s: &'static str, _index: usize| async move {
///     s.parse::<u32>().map_err(TaskError::fatal)
/// });
/// let numbers = process_in_parallel(vec!["1", "x", "3"], parse, ProcessorConfig::default())
///     .await
///     .unwrap();
/// assert_eq!(numbers, vec![1, 3]);
/// # }
/// ```
pub async fn process_in_parallel<T, R, W>(
    items: Vec<T>,
    work: W,
    cfg: ProcessorConfig,
) -> Result<Vec<R>, ConfigError>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    W: Work<T, R>,
{
    let processor = Processor::new(cfg)?;
    let results = processor
        .process_parallel(items, work, RunOptions::new())
        .await;
    Ok(results.into_iter().filter_map(|slot| slot.result).collect())
}
