//! # Lifecycle notifications emitted by the queue.
//!
//! The [`EventKind`] enum names the seven task transitions the queue
//! reports; [`Event`] carries the task view plus optional metadata.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order (e.g. through the broadcast-backed [`Bus`]).
//!
//! [`Bus`]: crate::events::Bus
//!
//! ## Example
//! ```
//! use taskline::EventKind;
//!
//! assert_eq!(EventKind::Retry.as_label(), "retry");
//! assert!(!EventKind::Enqueue.is_terminal());
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::TaskError;
use crate::tasks::Task;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of queue notifications, one per task transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Task accepted into the queue.
    ///
    /// Fires synchronously inside `enqueue`, before it returns.
    Enqueue,

    /// Task selected by the dispatch loop; an attempt is starting.
    ///
    /// Within one batch, `Dequeue` events fire in queue order before any
    /// member of the batch settles.
    Dequeue,

    /// Task manually suspended via `pause_task`.
    Pause,

    /// Task manually returned to its pre-pause status via `resume_task`.
    Resume,

    /// Terminal: the executor succeeded; the result future is resolved.
    Fulfilled,

    /// Terminal: the retry budget is exhausted; the result future is
    /// rejected with the aggregate of all attempt errors.
    Rejected,

    /// An attempt failed with retry budget remaining; the task is queued
    /// again. Carries the triggering attempt error.
    Retry,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Enqueue => "enqueue",
            EventKind::Dequeue => "dequeue",
            EventKind::Pause => "pause",
            EventKind::Resume => "resume",
            EventKind::Fulfilled => "fulfilled",
            EventKind::Rejected => "rejected",
            EventKind::Retry => "retry",
        }
    }

    /// True for the two kinds that accompany a terminal transition.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Fulfilled | EventKind::Rejected)
    }
}

/// One queue notification.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `task`: view of the task the transition belongs to
/// - `error`: the triggering attempt error, set only for [`EventKind::Retry`]
pub struct Event<T> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// The task this transition belongs to.
    pub task: Task<T>,
    /// Attempt error for failure-driven kinds.
    pub error: Option<TaskError>,
}

impl<T> Event<T> {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next global sequence number.
    pub fn new(kind: EventKind, task: Task<T>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task,
            error: None,
        }
    }

    /// Attaches the triggering attempt error.
    #[inline]
    pub fn with_error(mut self, error: TaskError) -> Self {
        self.error = Some(error);
        self
    }
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            at: self.at,
            kind: self.kind,
            task: self.task.clone(),
            error: self.error.clone(),
        }
    }
}
