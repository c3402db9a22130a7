//! Error types used by the taskline queue and its executors.
//!
//! This module defines two main error enums:
//!
//! - [`TaskError`] — failures of a single execution attempt, produced by executors.
//! - [`QueueError`] — failures surfaced on a task's result future by the queue itself.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

use crate::ids::TaskId;

/// # Errors produced by a single execution attempt.
///
/// Executors return these from [`Execute::execute`](crate::Execute::execute).
/// Every attempt error is recorded; once the retry budget is exhausted the
/// whole sequence is delivered through [`QueueError::Exhausted`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The executor failed with an application-level error.
    #[error("execution failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// The executor panicked; the panic was caught and folded into the
    /// normal failure path.
    #[error("executor panicked: {reason}")]
    Panicked {
        /// The panic payload, rendered as text.
        reason: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskline::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn fail(reason: impl Into<String>) -> Self {
        TaskError::Fail {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { reason } => format!("error: {reason}"),
            TaskError::Panicked { reason } => format!("panic: {reason}"),
        }
    }
}

/// # Errors delivered by the queue on a task's result future.
///
/// These represent the queue-level outcome of a task, as opposed to the
/// per-attempt [`TaskError`]s that feed into it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The retry budget is exhausted; `errors` holds one entry per attempt,
    /// in attempt order. Its length is always `max_retry_on_error + 1`.
    #[error("task failed after {} attempt(s)", errors.len())]
    Exhausted {
        /// Per-attempt failures, oldest first.
        errors: Vec<TaskError>,
    },

    /// The queue dropped the task (`clear`/`stop`) before it settled.
    /// The task never ran to completion and never will.
    #[error("task discarded before completion")]
    Discarded,

    /// A task selected for dispatch had no execution state associated.
    /// This is a programming-contract breach, not a task-level failure;
    /// the dispatch loop halts instead of skipping it.
    #[error("no execution state for selected task {id}")]
    MissingState {
        /// Identifier of the orphaned task.
        id: TaskId,
    },
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskline::QueueError;
    ///
    /// let err = QueueError::Discarded;
    /// assert_eq!(err.as_label(), "task_discarded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::Exhausted { .. } => "task_exhausted",
            QueueError::Discarded => "task_discarded",
            QueueError::MissingState { .. } => "queue_missing_state",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            QueueError::Exhausted { errors } => {
                let last = errors
                    .last()
                    .map(TaskError::as_message)
                    .unwrap_or_else(|| "no recorded errors".to_string());
                format!("exhausted after {} attempt(s); last: {last}", errors.len())
            }
            QueueError::Discarded => "discarded before completion".to_string(),
            QueueError::MissingState { id } => format!("missing execution state for {id}"),
        }
    }

    /// Returns the per-attempt errors when the task exhausted its budget.
    pub fn attempt_errors(&self) -> Option<&[TaskError]> {
        match self {
            QueueError::Exhausted { errors } => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_labels() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked {
                reason: "boom".into()
            }
            .as_label(),
            "task_panicked"
        );
    }

    #[test]
    fn test_exhausted_display_counts_attempts() {
        let err = QueueError::Exhausted {
            errors: vec![TaskError::fail("a"), TaskError::fail("b")],
        };
        assert_eq!(err.to_string(), "task failed after 2 attempt(s)");
        assert!(err.as_message().contains("last: error: b"));
    }

    #[test]
    fn test_attempt_errors_accessor() {
        let errors = vec![TaskError::fail("only")];
        let err = QueueError::Exhausted {
            errors: errors.clone(),
        };
        assert_eq!(err.attempt_errors(), Some(errors.as_slice()));
        assert_eq!(QueueError::Discarded.attempt_errors(), None);
    }
}
