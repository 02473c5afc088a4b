//! Runtime core: scheduling and run lifecycle.
//!
//! The public API from this module is [`Processor`] (with its builder,
//! configuration and per-run options) and [`process_in_parallel`].
//!
//! Internal modules:
//! - `processor`: scheduler loop, admission under the concurrency cap, cancellation;
//! - `actor`: runs a single task through its attempts with a fixed retry delay;
//! - `runner`: executes one attempt with timeout, panic isolation and event publishing;
//! - `aggregator`: index-addressed result slots;
//! - `notifier`: progress and progressive-readiness callbacks;
//! - `state`: per-run counters, cancellation flag and statistics.

mod actor;
mod aggregator;
mod builder;
mod config;
mod notifier;
mod options;
mod processor;
mod runner;
mod state;

pub use builder::ProcessorBuilder;
pub use config::ProcessorConfig;
pub use options::{ProgressFn, ProgressiveFn, RunOptions};
pub use processor::{Processor, process_in_parallel};
pub use state::{RunPhase, Stats};
