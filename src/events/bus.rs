//! # Broadcast-backed notification transport.
//!
//! [`Bus`] is a [`Channel`] implementation built on
//! [`tokio::sync::broadcast`]: `publish` is a non-blocking send into a
//! bounded ring, and each subscribed listener gets a dedicated worker task
//! that filters its kind and calls the listener off the publisher's path.
//!
//! ## Architecture
//! ```text
//! Publisher (queue engine):            Consumers:
//!   publish(Event) ──► broadcast ring ──► worker 1 ──► listener 1 (kind-filtered)
//!                           │        ──► worker 2 ──► listener 2 (kind-filtered)
//!                           └──────────► receiver() (raw, every kind)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits; with no receivers
//!   the event is dropped.
//! - **Lag handling**: a worker that falls behind more than the ring
//!   capacity skips the oldest events (reported via `tracing`).
//! - **Panic isolation**: a panicking listener is caught inside its own
//!   worker; other listeners are unaffected.
//! - **Decoupled delivery**: unlike [`ListenerHub`](crate::ListenerHub),
//!   delivery happens after the publishing call returns. Use the hub when
//!   callers rely on synchronous observation.
//!
//! `subscribe` spawns a worker and must therefore be called from within a
//! tokio runtime.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::events::channel::{Channel, Listener};
use crate::events::{Event, EventKind};

/// Default capacity of the broadcast ring.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Per-listener worker bookkeeping. The key is the listener's data
/// pointer, mirroring the pointer-identity contract of `unsubscribe`.
struct BusWorker {
    kind: EventKind,
    key: usize,
    handle: JoinHandle<()>,
}

/// Broadcast-channel notification transport.
///
/// Cheap to share behind an `Arc`; the ring capacity is fixed at
/// construction.
pub struct Bus<T> {
    tx: broadcast::Sender<Event<T>>,
    workers: Mutex<Vec<BusWorker>>,
}

impl<T: Send + Sync + 'static> Bus<T> {
    /// Creates a new bus with the given ring capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Creates a new receiver observing every subsequently published
    /// event, regardless of kind.
    ///
    /// - Each call creates an **independent** receiver.
    /// - A receiver only gets events **sent after** it was created.
    /// - Slow receivers observe `RecvError::Lagged(n)` and skip over
    ///   missed items.
    pub fn receiver(&self) -> broadcast::Receiver<Event<T>> {
        self.tx.subscribe()
    }
}

impl<T: Send + Sync + 'static> Default for Bus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl<T: Send + Sync + 'static> Channel<T> for Bus<T> {
    fn publish(&self, event: Event<T>) {
        let _ = self.tx.send(event);
    }

    fn subscribe(&self, kind: EventKind, listener: Listener<T>) {
        let mut rx = self.tx.subscribe();
        let key = listener_key(&listener);

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) if event.kind == kind => {
                        let call =
                            AssertUnwindSafe(|| listener(&event.task, event.error.as_ref()));
                        if panic::catch_unwind(call).is_err() {
                            tracing::warn!(
                                kind = kind.as_label(),
                                task = %event.task.id(),
                                "bus listener panicked; worker keeps running"
                            );
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            kind = kind.as_label(),
                            skipped,
                            "bus listener lagged; oldest events dropped"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.lock_workers().push(BusWorker { kind, key, handle });
    }

    fn unsubscribe(&self, kind: EventKind, listener: &Listener<T>) {
        let key = listener_key(listener);
        let mut workers = self.lock_workers();
        if let Some(at) = workers
            .iter()
            .position(|w| w.kind == kind && w.key == key)
        {
            let worker = workers.remove(at);
            worker.handle.abort();
        }
    }
}

impl<T> Bus<T> {
    fn lock_workers(&self) -> std::sync::MutexGuard<'_, Vec<BusWorker>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Bus<T> {
    fn drop(&mut self) {
        for worker in self.lock_workers().drain(..) {
            worker.handle.abort();
        }
    }
}

fn listener_key<T>(listener: &Listener<T>) -> usize {
    Arc::as_ptr(listener) as *const () as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TaskId;
    use crate::tasks::{Settled, Task};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::watch;
    use uuid::Uuid;

    fn test_event(kind: EventKind) -> Event<u32> {
        let (tx, rx) = watch::channel::<Settled<u32>>(None);
        std::mem::forget(tx);
        Event::new(kind, Task::new(TaskId::from(Uuid::new_v4()), None, rx))
    }

    async fn settle_workers() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_subscribed_listener_receives_matching_kind() {
        let bus: Bus<u32> = Bus::default();
        let hits = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&hits);
        bus.subscribe(
            EventKind::Fulfilled,
            Arc::new(move |_task, _err| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.publish(test_event(EventKind::Fulfilled));
        bus.publish(test_event(EventKind::Rejected));
        settle_workers().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let bus: Bus<u32> = Bus::default();
        let hits = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&hits);
        let listener: Listener<u32> = Arc::new(move |_task, _err| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        bus.subscribe(EventKind::Enqueue, Arc::clone(&listener));
        bus.publish(test_event(EventKind::Enqueue));
        settle_workers().await;

        bus.unsubscribe(EventKind::Enqueue, &listener);
        bus.publish(test_event(EventKind::Enqueue));
        settle_workers().await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_raw_receiver_sees_every_kind() {
        let bus: Bus<u32> = Bus::default();
        let mut rx = bus.receiver();

        bus.publish(test_event(EventKind::Enqueue));
        bus.publish(test_event(EventKind::Dequeue));

        assert_eq!(rx.recv().await.map(|e| e.kind), Ok(EventKind::Enqueue));
        assert_eq!(rx.recv().await.map(|e| e.kind), Ok(EventKind::Dequeue));
    }
}
