//! # Per-run options.
//!
//! [`RunOptions`] carries the callbacks and overrides of one
//! [`Processor::process_parallel`](crate::Processor::process_parallel) call.
//!
//! ## Example
//! ```rust
//! use batchvisor::RunOptions;
//!
//! let options: RunOptions<String> = RunOptions::new()
//!     .on_progress(|settled, total| println!("{settled}/{total}"))
//!     .on_progressive_ready(|partial| {
//!         let ready = partial.iter().filter(|slot| slot.is_success()).count();
//!         println!("{ready} results ready early");
//!     })
//!     .with_progressive_threshold(2);
//! # let _ = options;
//! ```

use tokio_util::sync::CancellationToken;

use crate::tasks::TaskResult;

/// Callback invoked once per settle with `(settled, total)`.
pub type ProgressFn = Box<dyn FnMut(usize, usize) + Send + 'static>;

/// Callback invoked once per run with the partially filled result array.
pub type ProgressiveFn<R> = Box<dyn FnOnce(&[TaskResult<R>]) + Send + 'static>;

/// Callbacks and overrides for a single run.
pub struct RunOptions<R> {
    pub(crate) on_progress: Option<ProgressFn>,
    pub(crate) on_progressive_ready: Option<ProgressiveFn<R>>,
    pub(crate) progressive_threshold: Option<usize>,
    pub(crate) cancel: Option<CancellationToken>,
}

impl<R> RunOptions<R> {
    /// Options with no callbacks and no overrides.
    pub fn new() -> Self {
        Self {
            on_progress: None,
            on_progressive_ready: None,
            progressive_threshold: None,
            cancel: None,
        }
    }

    /// Called after every settle with `(settled, total)`; never throttled.
    pub fn on_progress(mut self, f: impl FnMut(usize, usize) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Called exactly once, when the settled count first reaches the threshold.
    ///
    /// Pending slots in the slice are still unsettled.
    pub fn on_progressive_ready(
        mut self,
        f: impl FnOnce(&[TaskResult<R>]) + Send + 'static,
    ) -> Self {
        self.on_progressive_ready = Some(Box::new(f));
        self
    }

    /// Overrides [`ProcessorConfig::progressive_threshold`](crate::ProcessorConfig::progressive_threshold) for this run.
    pub fn with_progressive_threshold(mut self, threshold: usize) -> Self {
        self.progressive_threshold = Some(threshold);
        self
    }

    /// Links the run to an external token: cancelling it stops admission.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl<R> Default for RunOptions<R> {
    fn default() -> Self {
        Self::new()
    }
}
