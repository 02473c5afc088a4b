//! # Function-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn(T, usize) -> Fut`, producing a fresh
//! future per attempt. This avoids shared mutable state between attempts;
//! if state must be shared, capture an `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use batchvisor::{TaskError, Work, WorkFn};
//!
//! let fetch = WorkFn::new("fetch", |url: String, index: usize| async move {
//!     if url.is_empty() {
//!         return Err(TaskError::fatal(format!("empty url at {index}")));
//!     }
//!     Ok::<_, TaskError>(url.len())
//! });
//!
//! assert_eq!(fetch.name(), "fetch");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::work::{BoxWorkFuture, Work};

/// Function-backed work implementation.
///
/// Wraps a closure that *creates* a new future per attempt.
#[derive(Debug)]
pub struct WorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates a new function-backed unit of work.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the work and returns it behind an `Arc`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<T, R, F, Fut> Work<T, R> for WorkFn<F>
where
    F: Fn(T, usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, input: T, index: usize) -> BoxWorkFuture<R> {
        let fut = (self.f)(input, index);
        Box::pin(fut)
    }
}

impl<T, R, W> Work<T, R> for Arc<W>
where
    W: Work<T, R> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn spawn(&self, input: T, index: usize) -> BoxWorkFuture<R> {
        (**self).spawn(input, index)
    }
}
