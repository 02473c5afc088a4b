//! # Task abstractions and results.
//!
//! This module provides the core task-related types:
//! - [`Work`] - trait for an async unit of work over `(input, index)`
//! - [`WorkFn`] - closure-backed work implementation
//! - [`TaskResult`] - index-addressed outcome slot of one input
//! - `Task` - internal record of one input undergoing execution

mod result;
mod task;
mod work;
mod work_fn;

pub use result::TaskResult;
pub(crate) use task::Task;
pub use work::{BoxWorkFuture, Work};
pub use work_fn::WorkFn;
