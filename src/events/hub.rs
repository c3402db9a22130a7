//! # Synchronous in-place notification fan-out.
//!
//! [`ListenerHub`] is the default [`Channel`] implementation: a per-kind
//! listener registry dispatched synchronously from the publisher's context,
//! in registration order. This is the transport to pick when listeners are
//! cheap and callers rely on "the event has been observed by the time the
//! API call returns" (the `Enqueue` notification contract).
//!
//! ## Rules
//! - **Registration-order dispatch**: listeners for a kind run in the order
//!   they subscribed.
//! - **Re-entrancy**: the listener list is snapshotted before dispatch, so
//!   a listener may subscribe/unsubscribe from inside its own callback;
//!   the change applies from the next publish.
//! - **Panic isolation**: a panicking listener is caught and reported via
//!   `tracing`; remaining listeners still run.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use crate::events::channel::{Channel, Listener};
use crate::events::{Event, EventKind};

/// Synchronous listener registry, the default notification transport.
pub struct ListenerHub<T> {
    listeners: RwLock<HashMap<EventKind, Vec<Listener<T>>>>,
}

impl<T> ListenerHub<T> {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl<T> Default for ListenerHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> Channel<T> for ListenerHub<T> {
    fn publish(&self, event: Event<T>) {
        // Snapshot under the read lock, dispatch outside it: listeners may
        // re-enter the hub (or the queue) without deadlocking.
        let snapshot: Vec<Listener<T>> = {
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match listeners.get(&event.kind) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        for listener in snapshot {
            let call = AssertUnwindSafe(|| listener(&event.task, event.error.as_ref()));
            if panic::catch_unwind(call).is_err() {
                tracing::warn!(
                    kind = event.kind.as_label(),
                    task = %event.task.id(),
                    "listener panicked; remaining listeners still run"
                );
            }
        }
    }

    fn subscribe(&self, kind: EventKind, listener: Listener<T>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(listener);
    }

    fn unsubscribe(&self, kind: EventKind, listener: &Listener<T>) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = listeners.get_mut(&kind) {
            list.retain(|registered| !Arc::ptr_eq(registered, listener));
        }
    }
}
