//! # Shared queue state.
//!
//! One [`QueueState`] is shared between the engine's API surface and the
//! dispatch loop: the ordered task list (submission order, scanned in
//! order by selection) and the per-task execution records.
//!
//! Records are keyed by [`TaskId`] and live exactly as long as the queue
//! keeps the task: `clear`/`stop` drop them wholesale, which also drops
//! each record's result resolver and thereby rejects outstanding waiters
//! with [`QueueError::Discarded`](crate::QueueError::Discarded).
//!
//! The lock is a `std` mutex on purpose: every critical section is a few
//! field accesses and nothing awaits while holding it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::TaskError;
use crate::ids::TaskId;
use crate::tasks::{ExecuteRef, Settled, Task};

/// Engine-side state of one task, created at enqueue.
pub(crate) struct TaskRecord<T> {
    /// The work function, shared across attempts.
    pub(crate) execute: ExecuteRef<T>,
    /// Retries consumed so far. Never exceeds `max_retry_on_error`.
    pub(crate) retry_count: u32,
    /// One entry per failed attempt, oldest first.
    pub(crate) errors: Vec<TaskError>,
    /// Write side of the task's one-shot result slot.
    pub(crate) resolver: watch::Sender<Settled<T>>,
}

/// The ordered queue plus the record table.
pub(crate) struct QueueState<T> {
    /// Tasks in submission order. Selection scans this front to back.
    pub(crate) order: Vec<Task<T>>,
    /// Execution records keyed by task id.
    pub(crate) records: HashMap<TaskId, TaskRecord<T>>,
}

impl<T> QueueState<T> {
    pub(crate) fn new() -> Self {
        Self {
            order: Vec::new(),
            records: HashMap::new(),
        }
    }

    /// Drops every queued task and record. Outstanding result futures
    /// observe the dropped resolvers as `Discarded`.
    pub(crate) fn discard_all(&mut self) {
        self.order.clear();
        self.records.clear();
    }
}

/// Locks ignoring poisoning: critical sections never panic, so a poisoned
/// lock carries no broken invariants.
pub(crate) fn lock<T>(state: &Mutex<QueueState<T>>) -> MutexGuard<'_, QueueState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
