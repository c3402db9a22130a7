//! # TaskQueue: the public queue engine.
//!
//! The [`TaskQueue`] owns the ordered task list, the per-task execution
//! records, the notification channel, and the dispatch-loop handle. It is
//! the only component that mutates task state; [`Task`] views stay
//! read-only.
//!
//! ## High-level architecture
//! ```text
//! caller ──► enqueue(TaskSpec) ──► Task view + TaskRecord, publish Enqueue
//!
//! start() ──► spawn Dispatcher::run(token)
//!               └─► periodic tick ──► eligible prefix ──► batch ──► settle
//!
//! pause()/resume() ──► flag checked before each tick
//! pause_task()/resume_task() ──► per-task status, publish Pause/Resume
//! clear() ──► drop all tasks + records (outstanding results → Discarded)
//! stop()  ──► cancel loop + clear()
//! ```
//!
//! ## Example
//! ```no_run
//! use taskline::{ExecuteFn, QueueConfig, TaskContext, TaskError, TaskQueue, TaskSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue: TaskQueue<u32> = TaskQueue::new(QueueConfig::default());
//!     queue.start();
//!
//!     let task = queue.enqueue(TaskSpec::named(
//!         "answer",
//!         ExecuteFn::arc(|_ctx: TaskContext| async move { Ok::<_, TaskError>(42) }),
//!     ));
//!
//!     assert_eq!(task.result().await?, 42);
//!     queue.stop();
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::QueueConfig;
use crate::events::{Channel, Event, EventKind, Listener, ListenerHub};
use crate::ids::{IdSupplier, UuidIds};
use crate::queue::dispatch::Dispatcher;
use crate::queue::state::{lock, QueueState, TaskRecord};
use crate::tasks::{Task, TaskSpec};

/// Builder for constructing a [`TaskQueue`] with injected collaborators.
///
/// Defaults: [`ListenerHub`] transport, [`UuidIds`] identity supplier.
pub struct TaskQueueBuilder<T> {
    cfg: QueueConfig,
    ids: Arc<dyn IdSupplier>,
    channel: Arc<dyn Channel<T>>,
}

impl<T: Send + Sync + 'static> TaskQueueBuilder<T> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: QueueConfig) -> Self {
        Self {
            cfg,
            ids: Arc::new(UuidIds),
            channel: Arc::new(ListenerHub::new()),
        }
    }

    /// Sets the identity supplier.
    pub fn with_ids(mut self, ids: Arc<dyn IdSupplier>) -> Self {
        self.ids = ids;
        self
    }

    /// Sets the notification transport.
    ///
    /// The engine publishes one event per transition and never branches
    /// on which implementation it talks to.
    pub fn with_channel(mut self, channel: Arc<dyn Channel<T>>) -> Self {
        self.channel = channel;
        self
    }

    /// Builds the queue. The dispatch loop is not running yet; call
    /// [`TaskQueue::start`].
    pub fn build(self) -> TaskQueue<T> {
        TaskQueue {
            cfg: self.cfg,
            ids: self.ids,
            channel: self.channel,
            state: Arc::new(Mutex::new(QueueState::new())),
            paused: Arc::new(AtomicBool::new(false)),
            loop_token: Mutex::new(None),
        }
    }
}

/// In-process task queue with bounded concurrency, retries, and lifecycle
/// notifications.
///
/// All control methods are synchronous: they mutate state, fire their
/// notification, and return. [`TaskQueue::start`] (and a [`Bus`]-backed
/// channel's `subscribe`) spawn onto the ambient tokio runtime and must be
/// called from within one.
///
/// [`Bus`]: crate::Bus
pub struct TaskQueue<T> {
    cfg: QueueConfig,
    ids: Arc<dyn IdSupplier>,
    channel: Arc<dyn Channel<T>>,
    state: Arc<Mutex<QueueState<T>>>,
    paused: Arc<AtomicBool>,
    loop_token: Mutex<Option<CancellationToken>>,
}

impl<T: Send + Sync + 'static> TaskQueue<T> {
    /// Creates a queue with default collaborators (equivalent to
    /// `TaskQueue::builder(cfg).build()`).
    pub fn new(cfg: QueueConfig) -> Self {
        TaskQueueBuilder::new(cfg).build()
    }

    /// Returns a builder for injecting a custom channel or id supplier.
    pub fn builder(cfg: QueueConfig) -> TaskQueueBuilder<T> {
        TaskQueueBuilder::new(cfg)
    }

    /// Submits one unit of work.
    ///
    /// The task is appended at the tail with status `Accepted` and a fresh
    /// id from the supplier; the `Enqueue` notification fires synchronously
    /// before this returns. The executor is not validated here — failures
    /// surface only at execution.
    pub fn enqueue(&self, spec: TaskSpec<T>) -> Task<T> {
        let (name, execute) = spec.into_parts();
        let id = self.ids.generate();
        let (resolver, result) = watch::channel(None);
        let task = Task::new(id, name, result);

        {
            let mut state = lock(&self.state);
            state.order.push(task.clone());
            state.records.insert(
                id,
                TaskRecord {
                    execute,
                    retry_count: 0,
                    errors: Vec::new(),
                    resolver,
                },
            );
        }

        self.channel
            .publish(Event::new(EventKind::Enqueue, task.clone()));
        task
    }

    /// (Re)starts the dispatch loop.
    ///
    /// Any previous loop is cancelled first and the global pause flag is
    /// reset, so `start` after `stop`/`pause` resumes fresh dispatch. A
    /// batch already in flight under a previous loop settles on its own;
    /// its tasks are not eligible again until it does.
    pub fn start(&self) {
        let mut slot = self.lock_token();
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        self.paused.store(false, Ordering::Release);

        let token = CancellationToken::new();
        let dispatcher = Dispatcher::new(
            self.cfg,
            Arc::clone(&self.state),
            Arc::clone(&self.channel),
            Arc::clone(&self.paused),
        );
        tokio::spawn(dispatcher.run(token.clone()));
        *slot = Some(token);
    }

    /// Suspends dispatch: no new batch starts until [`TaskQueue::resume`]
    /// or [`TaskQueue::start`]. A batch already in flight settles normally.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Lifts a global [`TaskQueue::pause`].
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    /// Discards every queued task, whatever its status.
    ///
    /// Outstanding [`Task::result`] futures reject with
    /// [`QueueError::Discarded`](crate::QueueError::Discarded); no further
    /// notifications fire for discarded tasks.
    pub fn clear(&self) {
        lock(&self.state).discard_all();
    }

    /// Halts the dispatch loop and clears the queue.
    pub fn stop(&self) {
        if let Some(token) = self.lock_token().take() {
            token.cancel();
        }
        self.clear();
    }

    /// Manually suspends one task, excluding it from dispatch selection.
    ///
    /// Remembers the status the pause displaced so that
    /// [`TaskQueue::resume_task`] can restore it. No-op on terminal tasks.
    pub fn pause_task(&self, task: &Task<T>) {
        if task.pause_view() {
            self.channel
                .publish(Event::new(EventKind::Pause, task.clone()));
        }
    }

    /// Returns a paused task to the status the pause displaced: a never-run
    /// or to-retry task re-enters the eligible pool; a task paused while in
    /// flight stays `Performed` and is settled by its own attempt. No-op
    /// when the task is not paused.
    pub fn resume_task(&self, task: &Task<T>) {
        if task.resume_view() {
            self.channel
                .publish(Event::new(EventKind::Resume, task.clone()));
        }
    }

    /// Registers `listener` for events of `kind`.
    pub fn add_listener(&self, kind: EventKind, listener: Listener<T>) {
        self.channel.subscribe(kind, listener);
    }

    /// Removes a previously registered listener (pointer identity).
    pub fn remove_listener(&self, kind: EventKind, listener: &Listener<T>) {
        self.channel.unsubscribe(kind, listener);
    }

    /// Returns the notification channel the queue publishes into.
    pub fn channel(&self) -> &Arc<dyn Channel<T>> {
        &self.channel
    }

    /// Returns a snapshot of the queued tasks, in submission order.
    pub fn tasks(&self) -> Vec<Task<T>> {
        lock(&self.state).order.clone()
    }

    fn lock_token(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.loop_token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for TaskQueue<T> {
    /// The dispatch loop holds only `Arc` clones; cancel it so a dropped
    /// queue does not keep ticking in the background.
    fn drop(&mut self) {
        if let Some(token) = self
            .loop_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}
