//! # Task abstractions.
//!
//! This module provides the task-facing types:
//! - [`Task`] - read-only, cloneable view of one submitted unit of work
//! - [`Status`] - the task lifecycle states
//! - [`Execute`] - trait for implementing executors
//! - [`ExecuteFn`] - function-backed executor implementation
//! - [`ExecuteRef`] - shared executor handle (`Arc<dyn Execute<T>>`)
//! - [`TaskSpec`] - enqueue bundle (optional name + executor)

mod execute;
mod spec;
mod task;

pub use execute::{Execute, ExecuteFn, ExecuteRef, TaskContext};
pub use spec::TaskSpec;
pub use task::{Status, Task};

pub(crate) use task::Settled;
