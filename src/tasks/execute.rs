//! # Executor abstraction and function-backed implementation.
//!
//! This module defines the [`Execute`] trait (the unit of work the queue
//! runs) and a convenient function-backed implementation [`ExecuteFn`].
//! The common handle type is [`ExecuteRef`], an `Arc<dyn Execute<T>>`
//! suitable for sharing across attempts.
//!
//! Each attempt calls [`Execute::execute`] anew with the task's
//! [`TaskContext`]; for `ExecuteFn` that produces a **fresh** future per
//! attempt, so there is no hidden state between retries. Shared state, if
//! needed, goes through an explicit `Arc<...>` inside the closure.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::ids::TaskId;

/// Identity handed to an executor for one attempt.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// The task's unique identifier.
    pub id: TaskId,
    /// The task's optional human-readable name.
    pub name: Option<Arc<str>>,
}

impl TaskContext {
    /// Returns the task name, if one was given at enqueue.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// # One unit of work.
///
/// An executor receives the task's [`TaskContext`] and either produces the
/// task's value or fails with a [`TaskError`]. The queue absorbs failures
/// into its retry state machine; nothing an executor returns (or panics
/// with) escapes the dispatch loop.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use taskline::{Execute, TaskContext, TaskError};
///
/// struct Fetch;
///
/// #[async_trait]
/// impl Execute<String> for Fetch {
///     async fn execute(&self, ctx: TaskContext) -> Result<String, TaskError> {
///         Ok(format!("fetched by {}", ctx.id))
///     }
/// }
/// ```
#[async_trait]
pub trait Execute<T>: Send + Sync + 'static {
    /// Runs one attempt to completion.
    async fn execute(&self, ctx: TaskContext) -> Result<T, TaskError>;
}

/// Shared handle to an executor.
pub type ExecuteRef<T> = Arc<dyn Execute<T>>;

/// Function-backed executor.
///
/// Wraps a closure that *creates* a new future per attempt.
#[derive(Debug)]
pub struct ExecuteFn<F> {
    f: F,
}

impl<F> ExecuteFn<F> {
    /// Creates a new function-backed executor.
    ///
    /// Prefer [`ExecuteFn::arc`] when you immediately need an [`ExecuteRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the executor and returns it as a shared handle.
    ///
    /// ## Example
    /// ```
    /// use taskline::{ExecuteFn, TaskContext, TaskError};
    ///
    /// let double = ExecuteFn::arc(|_ctx: TaskContext| async move {
    ///     Ok::<_, TaskError>(21 * 2)
    /// });
    /// # let _ = double;
    /// ```
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<T, F, Fut> Execute<T> for ExecuteFn<F>
where
    T: Send + 'static,
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    async fn execute(&self, ctx: TaskContext) -> Result<T, TaskError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ctx(name: Option<&str>) -> TaskContext {
        TaskContext {
            id: TaskId::from(Uuid::new_v4()),
            name: name.map(Arc::from),
        }
    }

    #[tokio::test]
    async fn test_execute_fn_passes_context_through() {
        let exec = ExecuteFn::arc(|ctx: TaskContext| async move {
            Ok::<_, TaskError>(ctx.name().unwrap_or("anonymous").to_string())
        });
        let named = exec.execute(ctx(Some("report"))).await;
        assert_eq!(named, Ok("report".to_string()));
        let anonymous = exec.execute(ctx(None)).await;
        assert_eq!(anonymous, Ok("anonymous".to_string()));
    }

    #[tokio::test]
    async fn test_execute_fn_produces_fresh_future_per_attempt() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        let exec = ExecuteFn::arc(move |_ctx: TaskContext| {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, TaskError>(n) }
        });

        assert_eq!(exec.execute(ctx(None)).await, Ok(1));
        assert_eq!(exec.execute(ctx(None)).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
