//! # Task status and the read-only task view.
//!
//! [`Task`] is the handle a caller gets back from
//! [`TaskQueue::enqueue`](crate::TaskQueue::enqueue): a cheap, cloneable,
//! read-only view of one unit of work. All mutation goes through the queue
//! engine; the view only exposes accessors and the awaitable result.
//!
//! ## Identity
//! A task's identity is the allocation behind the view, not its field
//! values: two tasks with the same name (or even, with a broken id
//! supplier, the same id) are still distinct tasks. Use [`Task::same`] to
//! test identity.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::error::QueueError;
use crate::ids::TaskId;

/// Lifecycle status of a task.
///
/// `Fulfilled` and `Rejected` are terminal; every other status can still
/// move. Only `Accepted` and `ToRetry` are eligible for dispatch selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Queued, waiting for a dispatch tick. Initial status.
    Accepted,
    /// Selected by the dispatch loop; an attempt is in flight.
    Performed,
    /// Manually suspended; excluded from dispatch selection.
    Paused,
    /// The last attempt failed and retry budget remains; eligible again.
    ToRetry,
    /// Terminal: the executor succeeded and the result is resolved.
    Fulfilled,
    /// Terminal: the retry budget is exhausted and the result is rejected.
    Rejected,
}

impl Status {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Accepted => "accepted",
            Status::Performed => "performed",
            Status::Paused => "paused",
            Status::ToRetry => "to_retry",
            Status::Fulfilled => "fulfilled",
            Status::Rejected => "rejected",
        }
    }

    /// True for `Fulfilled` and `Rejected`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Fulfilled | Status::Rejected)
    }

    /// True when the dispatch loop may select this task.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        matches!(self, Status::Accepted | Status::ToRetry)
    }
}

/// The settled value of a task's result slot. `None` until settlement.
pub(crate) type Settled<T> = Option<Result<T, QueueError>>;

/// Mutable status record, shared between the engine and every view clone.
///
/// `preempted` remembers the status a manual pause displaced, so that
/// resuming can put the task back into the pool it came from.
struct StatusCell {
    status: Status,
    preempted: Option<Status>,
}

/// Shared backing storage of one task.
struct TaskCell<T> {
    id: TaskId,
    name: Option<Arc<str>>,
    state: Mutex<StatusCell>,
    result: watch::Receiver<Settled<T>>,
}

/// Read-only view of one submitted unit of work.
///
/// Cloning is cheap (an `Arc` bump) and every clone observes the same
/// underlying task. The view exposes no mutation: status advances only
/// through the owning [`TaskQueue`](crate::TaskQueue).
pub struct Task<T> {
    cell: Arc<TaskCell<T>>,
}

impl<T> Task<T> {
    /// Creates the view and its backing cell with status `Accepted`.
    pub(crate) fn new(
        id: TaskId,
        name: Option<Arc<str>>,
        result: watch::Receiver<Settled<T>>,
    ) -> Self {
        Self {
            cell: Arc::new(TaskCell {
                id,
                name,
                state: Mutex::new(StatusCell {
                    status: Status::Accepted,
                    preempted: None,
                }),
                result,
            }),
        }
    }

    /// Returns the task's unique identifier.
    pub fn id(&self) -> TaskId {
        self.cell.id
    }

    /// Returns the optional human-readable name.
    pub fn name(&self) -> Option<&str> {
        self.cell.name.as_deref()
    }

    /// Returns the current lifecycle status.
    pub fn status(&self) -> Status {
        self.lock_state().status
    }

    /// True when `a` and `b` are views of the same task.
    ///
    /// Identity is the shared allocation; field equality is irrelevant.
    pub fn same(a: &Task<T>, b: &Task<T>) -> bool {
        Arc::ptr_eq(&a.cell, &b.cell)
    }

    /// Awaits the task's final result.
    ///
    /// Resolves with the executor's value once the task is `Fulfilled`,
    /// or with a [`QueueError`]:
    /// - [`QueueError::Exhausted`] when the retry budget ran out
    ///   (per-attempt errors, in attempt order);
    /// - [`QueueError::Discarded`] when the queue dropped the task via
    ///   `clear`/`stop` before it settled.
    ///
    /// Any number of independent callers may await the same task; each
    /// receives a clone of the settled value.
    pub async fn result(&self) -> Result<T, QueueError>
    where
        T: Clone,
    {
        let mut rx = self.cell.result.clone();
        let settled = match rx.wait_for(|slot| slot.is_some()).await {
            Ok(settled) => settled.clone().unwrap_or(Err(QueueError::Discarded)),
            // Resolver dropped without settling: the record was discarded.
            Err(_) => Err(QueueError::Discarded),
        };
        settled
    }

    /// Returns the name as the shared allocation, for executor contexts.
    pub(crate) fn name_arc(&self) -> Option<Arc<str>> {
        self.cell.name.clone()
    }

    /// Engine-side transition. Unconditional: settlement overwrites a
    /// pause that raced an in-flight attempt.
    pub(crate) fn set_status(&self, status: Status) {
        let mut state = self.lock_state();
        state.status = status;
        state.preempted = None;
    }

    /// Engine-side manual pause. Returns `false` (no transition, no event)
    /// for terminal tasks; re-pausing a paused task keeps the original
    /// preempted status.
    pub(crate) fn pause_view(&self) -> bool {
        let mut state = self.lock_state();
        match state.status {
            Status::Fulfilled | Status::Rejected => false,
            Status::Paused => true,
            prior => {
                state.preempted = Some(prior);
                state.status = Status::Paused;
                true
            }
        }
    }

    /// Engine-side manual resume: restores the status the pause displaced.
    /// Returns `false` (no transition, no event) when the task is not
    /// paused.
    pub(crate) fn resume_view(&self) -> bool {
        let mut state = self.lock_state();
        if state.status != Status::Paused {
            return false;
        }
        state.status = state.preempted.take().unwrap_or(Status::Accepted);
        true
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, StatusCell> {
        // Critical sections never panic, so a poisoned lock carries no
        // broken invariants.
        self.cell.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.cell.id)
            .field("name", &self.cell.name)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_task() -> (Task<u32>, watch::Sender<Settled<u32>>) {
        let (tx, rx) = watch::channel(None);
        let task = Task::new(TaskId::from(Uuid::new_v4()), Some(Arc::from("demo")), rx);
        (task, tx)
    }

    #[test]
    fn test_new_task_is_accepted() {
        let (task, _tx) = test_task();
        assert_eq!(task.status(), Status::Accepted);
        assert_eq!(task.name(), Some("demo"));
    }

    #[test]
    fn test_clone_is_same_task() {
        let (task, _tx) = test_task();
        let other = task.clone();
        assert!(Task::same(&task, &other));
    }

    #[test]
    fn test_distinct_tasks_are_never_same() {
        let (a, _ta) = test_task();
        let (b, _tb) = test_task();
        assert!(!Task::same(&a, &b));
    }

    #[test]
    fn test_pause_remembers_preempted_status() {
        let (task, _tx) = test_task();
        task.set_status(Status::ToRetry);
        assert!(task.pause_view());
        assert_eq!(task.status(), Status::Paused);
        // Re-pausing keeps the original preempted status.
        assert!(task.pause_view());
        assert!(task.resume_view());
        assert_eq!(task.status(), Status::ToRetry);
    }

    #[test]
    fn test_pause_on_terminal_is_refused() {
        let (task, _tx) = test_task();
        task.set_status(Status::Fulfilled);
        assert!(!task.pause_view());
        assert_eq!(task.status(), Status::Fulfilled);
    }

    #[test]
    fn test_resume_without_pause_is_refused() {
        let (task, _tx) = test_task();
        assert!(!task.resume_view());
        assert_eq!(task.status(), Status::Accepted);
    }

    #[test]
    fn test_settlement_overwrites_racing_pause() {
        let (task, _tx) = test_task();
        task.set_status(Status::Performed);
        assert!(task.pause_view());
        task.set_status(Status::Fulfilled);
        assert_eq!(task.status(), Status::Fulfilled);
        assert!(!task.resume_view());
    }

    #[tokio::test]
    async fn test_result_resolves_for_every_waiter() {
        let (task, tx) = test_task();
        let other = task.clone();
        tx.send(Some(Ok(7))).ok();
        assert_eq!(task.result().await, Ok(7));
        assert_eq!(other.result().await, Ok(7));
    }

    #[tokio::test]
    async fn test_result_rejects_discarded_when_resolver_dropped() {
        let (task, tx) = test_task();
        drop(tx);
        assert_eq!(task.result().await, Err(QueueError::Discarded));
    }
}
