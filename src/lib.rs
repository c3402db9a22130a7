//! # taskline
//!
//! **Taskline** is an in-process task queue for Rust.
//!
//! Callers submit units of work; the queue runs at most `concurrent_tasks`
//! of them at a time, retries failures up to a configured budget, delivers
//! each task's eventual value (or aggregated failure) through an awaitable
//! result, and emits one notification per lifecycle transition.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!      ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!      │   TaskSpec   │   │   TaskSpec   │   │   TaskSpec   │
//!      │ (name + fn)  │   │ (name + fn)  │   │ (name + fn)  │
//!      └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!             ▼ enqueue          ▼                  ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  TaskQueue (engine)                                              │
//! │  - order list (submission order) + per-task records              │
//! │  - IdSupplier (fresh TaskId per enqueue)                         │
//! │  - Channel (one Event per transition)                            │
//! │  - pause flag + dispatch-loop CancellationToken                  │
//! └──────────────────────────────┬───────────────────────────────────┘
//!                                ▼ start()
//!                     ┌────────────────────────┐
//!                     │  Dispatcher (tick loop)│
//!                     │  select ≤ N eligible   │
//!                     │  run batch, settle     │
//!                     └───┬────────────────┬───┘
//!                         ▼                ▼
//!                   Task views        Channel ──► listeners
//!                   (result())        (hub: in-place, bus: broadcast)
//! ```
//!
//! ### Lifecycle
//! ```text
//! enqueue ──► Accepted ──► Performed ──► Fulfilled   (result resolves)
//!                ▲             │
//!                │             ├──► ToRetry ──► Performed ──► ...
//!                │             │      (budget left; Retry event)
//!                │             └──► Rejected  (budget exhausted;
//!                │                            result rejects aggregate)
//!     pause_task ▼ resume_task
//!              Paused  (excluded from selection; resume restores the
//!                       status the pause displaced)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                   |
//! |-------------------|---------------------------------------------------------------|--------------------------------------|
//! | **Submission**    | Describe work as async functions or custom executors.         | [`TaskSpec`], [`Execute`], [`ExecuteFn`] |
//! | **Results**       | Await a task's value or aggregated failure, any number of times. | [`Task`], [`QueueError`]          |
//! | **Dispatch**      | Bounded-concurrency batches on a periodic tick.               | [`TaskQueue`], [`QueueConfig`]       |
//! | **Notifications** | One event per transition, pluggable transport.                | [`EventKind`], [`Channel`], [`ListenerHub`], [`Bus`] |
//! | **Identity**      | Injectable id supplier (uuid-v4 by default).                  | [`TaskId`], [`IdSupplier`], [`UuidIds`] |
//! | **Errors**        | Typed attempt-level and queue-level errors.                   | [`TaskError`], [`QueueError`]        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use taskline::{EventKind, ExecuteFn, QueueConfig, TaskContext, TaskError, TaskQueue, TaskSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = QueueConfig::default();
//!     cfg.concurrent_tasks = 2;
//!     cfg.max_retry_on_error = 1;
//!
//!     let queue: TaskQueue<String> = TaskQueue::new(cfg);
//!
//!     // React to transitions (optional).
//!     queue.add_listener(
//!         EventKind::Fulfilled,
//!         std::sync::Arc::new(|task, _err| {
//!             println!("done: {}", task.name().unwrap_or("<unnamed>"));
//!         }),
//!     );
//!
//!     queue.start();
//!
//!     let report = queue.enqueue(TaskSpec::named(
//!         "report",
//!         ExecuteFn::arc(|ctx: TaskContext| async move {
//!             Ok::<_, TaskError>(format!("report by {}", ctx.id))
//!         }),
//!     ));
//!
//!     let value = report.result().await?;
//!     println!("{value}");
//!
//!     queue.stop();
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod ids;
mod queue;
mod tasks;

// ---- Public re-exports ----

pub use config::QueueConfig;
pub use error::{QueueError, TaskError};
pub use events::{Bus, Channel, Event, EventKind, Listener, ListenerHub, DEFAULT_BUS_CAPACITY};
pub use ids::{IdSupplier, TaskId, UuidIds};
pub use queue::{TaskQueue, TaskQueueBuilder};
pub use tasks::{Execute, ExecuteFn, ExecuteRef, Status, Task, TaskContext, TaskSpec};

// Optional: expose a simple built-in stdout logger (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
