//! # batchvisor
//!
//! **Batchvisor** runs a batch of independent async work items under a
//! concurrency cap.
//!
//! Every input gets exactly one result slot, in input order, holding either a
//! value or an error. Failed attempts are retried after a fixed delay, each
//! attempt can be bounded by a timeout, progress is reported on every settle,
//! and a run can be cancelled (no new admissions, in-flight work finishes).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     items: [i0, i1, i2, ... iN-1]          work: impl Work<T, R>
//!                      │                               │
//!                      ▼                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Processor (scheduler loop, one per process_parallel call)        │
//! │  - queue of (index, item) waiting for admission                   │
//! │  - JoinSet of in-flight actors (≤ max_concurrency)                │
//! │  - ResultAggregator (N index-addressed slots)                     │
//! │  - ProgressNotifier (on_progress / on_progressive_ready)          │
//! │  - RunState (counters + cancellation token, read by stats/cancel) │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  TaskActor   │   │  TaskActor   │   │  TaskActor   │
//!     │ (retry loop) │   │ (retry loop) │   │ (retry loop) │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Publishes:       │                  │
//!      │ - TaskStarting   │ - TaskFailed     │ - TimeoutHit
//!      │ - RetryScheduled │                  │
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: ProcessorConfig::bus_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                       worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle of one task
//! ```text
//! admitted (in_flight < cap, not cancelled) ──► TaskActor::run()
//!
//! loop {
//!   ├─► attempt += 1, publish TaskStarting
//!   ├─► run_once(work, input, timeout)
//!   │       ├─ Ok  ──► settle slot with value
//!   │       └─ Err ──► publish TaskFailed
//!   │                  ├─ Fatal / attempts exhausted ─► settle slot with error
//!   │                  └─ otherwise ─► RetryScheduled, sleep(retry_delay), continue
//! }
//! settle ──► slot[index], counters, on_progress, maybe on_progressive_ready
//!        ──► admit next queued item
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Scheduling**    | Bounded concurrency, ordered results, cancellation, stats.   | [`Processor`], [`RunOptions`], [`Stats`]    |
//! | **Work**          | Define the unit of work as a closure or a type.              | [`Work`], [`WorkFn`]                        |
//! | **Results**       | One slot per input, value or error.                          | [`TaskResult`]                              |
//! | **Policies**      | Retry count, fixed delay, per-attempt timeout.               | [`RetryPolicy`]                             |
//! | **Errors**        | Typed task and configuration errors.                         | [`TaskError`], [`ConfigError`]              |
//! | **Subscriber API**| Hook into run and attempt events.                            | [`Subscribe`], [`Event`]                    |
//! | **Configuration** | Immutable per-processor settings.                            | [`ProcessorConfig`]                         |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that writes events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use batchvisor::{Processor, ProcessorConfig, RunOptions, TaskError, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = ProcessorConfig {
//!         max_concurrency: 2,
//!         retry_attempts: 2,
//!         retry_delay: Duration::from_millis(10),
//!         timeout: Some(Duration::from_secs(1)),
//!         ..ProcessorConfig::default()
//!     };
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn batchvisor::Subscribe>> = vec![Arc::new(batchvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn batchvisor::Subscribe>> = Vec::new();
//!
//!     let processor = Processor::builder(cfg).with_subscribers(subs).build()?;
//!
//!     let square = WorkFn::new("square", |x: u64, _index: usize| async move {
//!         tokio::time::sleep(Duration::from_millis(x)).await;
//!         Ok::<_, TaskError>(x * x)
//!     });
//!
//!     let results = processor
//!         .process_parallel(
//!             vec![3, 1, 2],
//!             square,
//!             RunOptions::new().on_progress(|settled, total| println!("{settled}/{total}")),
//!         )
//!         .await;
//!
//!     let values: Vec<_> = results.into_iter().filter_map(|slot| slot.result).collect();
//!     assert_eq!(values, vec![9, 1, 4]);
//!
//!     processor.shutdown().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Processor, ProcessorBuilder, ProcessorConfig, ProgressFn, ProgressiveFn, RunOptions, RunPhase,
    Stats, process_in_parallel,
};
pub use error::{ConfigError, ErrorKind, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::RetryPolicy;
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxWorkFuture, TaskResult, Work, WorkFn};

// Re-exported so callers can link runs to their own cancellation trees.
pub use tokio_util::sync::CancellationToken;

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
