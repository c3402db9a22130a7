//! # Dispatch loop: periodic selection and batch execution.
//!
//! One [`Dispatcher`] per started queue drives eligible tasks through
//! their attempts:
//!
//! ```text
//! loop {
//!   ├─► wait: tick interval (cancellable)
//!   ├─► skip if globally paused
//!   ├─► select eligible prefix (Accepted | ToRetry, queue order,
//!   │                           ≤ concurrent_tasks)
//!   ├─► mark whole batch Performed, publish Dequeue (queue order)
//!   ├─► spawn all executors into a JoinSet
//!   └─► settle each completion as it arrives:
//!         ├─ Ok(value)                 → Fulfilled, resolve, publish
//!         ├─ Err, budget remaining     → ToRetry, publish Retry(err)
//!         └─ Err, budget exhausted     → Rejected, reject aggregate, publish
//! }
//! ```
//!
//! ## Rules
//! - **No overlapping batches**: the loop itself awaits full settlement
//!   before the next selection; ticks that fire meanwhile are skipped.
//! - **Executor panics** are caught and folded into the failure path as
//!   attempt errors; the loop never dies to a task.
//! - **Missing records fail hard**: a selected task without execution
//!   state is a contract breach — the loop logs it and halts rather than
//!   silently skipping (`start()` brings the queue back).
//! - **Discarded settlements are silent**: when `clear`/`stop` raced an
//!   in-flight attempt, its settlement finds no record and produces no
//!   event and no transition.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::QueueConfig;
use crate::error::{QueueError, TaskError};
use crate::events::{Channel, Event, EventKind};
use crate::queue::state::{lock, QueueState};
use crate::tasks::{ExecuteRef, Status, Task, TaskContext};

/// One selected task, ready to run.
struct BatchEntry<T> {
    task: Task<T>,
    execute: ExecuteRef<T>,
}

/// Periodic tick loop over the shared queue state.
pub(crate) struct Dispatcher<T> {
    cfg: QueueConfig,
    state: Arc<Mutex<QueueState<T>>>,
    channel: Arc<dyn Channel<T>>,
    paused: Arc<AtomicBool>,
}

impl<T: Send + Sync + 'static> Dispatcher<T> {
    pub(crate) fn new(
        cfg: QueueConfig,
        state: Arc<Mutex<QueueState<T>>>,
        channel: Arc<dyn Channel<T>>,
        paused: Arc<AtomicBool>,
    ) -> Self {
        Self {
            cfg,
            state,
            channel,
            paused,
        }
    }

    /// Runs until cancelled or until a dispatch invariant is violated.
    pub(crate) async fn run(self, token: CancellationToken) {
        let mut tick = time::interval(self.cfg.tick_interval_clamped());
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tick.tick() => {}
            }
            if self.paused.load(Ordering::Acquire) {
                continue;
            }
            if let Err(err) = self.run_batch().await {
                tracing::error!(
                    error = %err,
                    label = err.as_label(),
                    "dispatch tick failed; halting dispatch"
                );
                break;
            }
        }
    }

    /// Selects, runs, and settles one batch. `Ok` with an empty selection
    /// is a no-op tick.
    async fn run_batch(&self) -> Result<(), QueueError> {
        let batch = self.select_batch()?;
        if batch.is_empty() {
            return Ok(());
        }

        // The whole batch leaves the eligible set before anything runs:
        // Dequeue notifications fire in queue order, ahead of any
        // settlement.
        for entry in &batch {
            entry.task.set_status(Status::Performed);
            self.channel
                .publish(Event::new(EventKind::Dequeue, entry.task.clone()));
        }

        let mut inflight = JoinSet::new();
        for entry in batch {
            let ctx = TaskContext {
                id: entry.task.id(),
                name: entry.task.name_arc(),
            };
            let task = entry.task;
            let execute = entry.execute;
            inflight.spawn(async move {
                let outcome = AssertUnwindSafe(execute.execute(ctx))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(TaskError::Panicked {
                            reason: panic_reason(panic.as_ref()),
                        })
                    });
                (task, outcome)
            });
        }

        // Each settlement is handled the moment it arrives; the batch (and
        // with it the concurrency ceiling) is done once the set drains.
        while let Some(joined) = inflight.join_next().await {
            match joined {
                Ok((task, outcome)) => self.settle(&task, outcome),
                Err(join_err) => {
                    tracing::error!(error = %join_err, "batch member lost before settlement");
                }
            }
        }
        Ok(())
    }

    /// Order-preserving eligible prefix, truncated to the ceiling.
    fn select_batch(&self) -> Result<Vec<BatchEntry<T>>, QueueError> {
        let limit = self.cfg.concurrent_tasks_clamped();
        let state = lock(&self.state);

        let mut batch = Vec::new();
        for task in &state.order {
            if batch.len() == limit {
                break;
            }
            if !task.status().is_eligible() {
                continue;
            }
            let Some(record) = state.records.get(&task.id()) else {
                return Err(QueueError::MissingState { id: task.id() });
            };
            batch.push(BatchEntry {
                task: task.clone(),
                execute: Arc::clone(&record.execute),
            });
        }
        Ok(batch)
    }

    /// Applies one attempt's outcome to the state machine.
    fn settle(&self, task: &Task<T>, outcome: Result<T, TaskError>) {
        let mut state = lock(&self.state);
        let Some(record) = state.records.get_mut(&task.id()) else {
            // Discarded mid-flight; the resolver is gone and waiters
            // already observed Discarded. Nothing fires.
            tracing::debug!(id = %task.id(), "settlement for a discarded task dropped");
            return;
        };

        match outcome {
            Ok(value) => {
                task.set_status(Status::Fulfilled);
                let _ = record.resolver.send(Some(Ok(value)));
                drop(state);
                self.channel
                    .publish(Event::new(EventKind::Fulfilled, task.clone()));
            }
            Err(err) => {
                record.errors.push(err.clone());
                if record.retry_count < self.cfg.max_retry_on_error {
                    record.retry_count += 1;
                    task.set_status(Status::ToRetry);
                    drop(state);
                    self.channel
                        .publish(Event::new(EventKind::Retry, task.clone()).with_error(err));
                } else {
                    let errors = record.errors.clone();
                    task.set_status(Status::Rejected);
                    let _ = record.resolver.send(Some(Err(QueueError::Exhausted { errors })));
                    drop(state);
                    self.channel
                        .publish(Event::new(EventKind::Rejected, task.clone()));
                }
            }
        }
    }
}

/// Renders a caught panic payload the way it was raised.
fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
