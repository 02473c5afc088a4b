//! # Unit of work.
//!
//! [`Work`] is the opaque operation the processor parallelizes: it maps an
//! `(input, index)` pair to an eventual `Result<R, TaskError>`. Every call to
//! [`Work::spawn`] must return a **fresh** future; retries call it again.
//!
//! # Example
//! ```
//! use batchvisor::{BoxWorkFuture, TaskError, Work};
//!
//! struct Double;
//!
//! impl Work<u64, u64> for Double {
//!     fn name(&self) -> &str { "double" }
//!
//!     fn spawn(&self, input: u64, _index: usize) -> BoxWorkFuture<u64> {
//!         Box::pin(async move {
//!             input.checked_mul(2).ok_or_else(|| TaskError::fatal("overflow"))
//!         })
//!     }
//! }
//! ```

use std::pin::Pin;

use crate::error::TaskError;

/// Boxed future produced by one attempt of a [`Work`].
pub type BoxWorkFuture<R> = Pin<Box<dyn Future<Output = Result<R, TaskError>> + Send + 'static>>;

/// # Asynchronous unit of work over indexed inputs.
///
/// `spawn` receives the input and its zero-based index so it can report
/// position-aware errors. Implementations must be shareable across the
/// concurrently running tasks of a batch.
pub trait Work<T, R>: Send + Sync + 'static {
    /// Returns a stable, human-readable name (used in events).
    fn name(&self) -> &str;

    /// Starts one attempt for `input` at `index`.
    fn spawn(&self, input: T, index: usize) -> BoxWorkFuture<R>;
}
