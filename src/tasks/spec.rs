//! # Enqueue specification.
//!
//! Defines [`TaskSpec`], the bundle a caller hands to
//! [`TaskQueue::enqueue`](crate::TaskQueue::enqueue): an executor plus an
//! optional human-readable name. The name is advisory — many tasks may
//! share one, and listeners must distinguish tasks by identity, not name.

use std::sync::Arc;

use crate::tasks::execute::ExecuteRef;

/// Specification of one unit of work to enqueue.
///
/// ## Example
/// ```
/// use taskline::{ExecuteFn, TaskContext, TaskError, TaskSpec};
///
/// let spec: TaskSpec<u32> = TaskSpec::named(
///     "answer",
///     ExecuteFn::arc(|_ctx: TaskContext| async move { Ok::<_, TaskError>(42) }),
/// );
/// assert_eq!(spec.name(), Some("answer"));
/// ```
pub struct TaskSpec<T> {
    name: Option<Arc<str>>,
    execute: ExecuteRef<T>,
}

impl<T> TaskSpec<T> {
    /// Creates an anonymous spec.
    pub fn new(execute: ExecuteRef<T>) -> Self {
        Self {
            name: None,
            execute,
        }
    }

    /// Creates a named spec.
    pub fn named(name: impl Into<Arc<str>>, execute: ExecuteRef<T>) -> Self {
        Self {
            name: Some(name.into()),
            execute,
        }
    }

    /// Returns the optional name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns a reference to the executor.
    pub fn execute(&self) -> &ExecuteRef<T> {
        &self.execute
    }

    /// Splits the spec into its parts for record construction.
    pub(crate) fn into_parts(self) -> (Option<Arc<str>>, ExecuteRef<T>) {
        (self.name, self.execute)
    }
}

impl<T> Clone for TaskSpec<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            execute: Arc::clone(&self.execute),
        }
    }
}
