//! # Notification transport abstraction.
//!
//! The queue engine publishes one [`Event`] per task transition into a
//! [`Channel`] and never looks at how the event travels from there. The
//! capability set is deliberately small — publish, subscribe, unsubscribe —
//! so environment-specific transports (synchronous in-place fan-out,
//! broadcast channel, something custom) can be substituted without touching
//! scheduler logic.
//!
//! ## Listener identity
//! Listeners are shared closures; `unsubscribe` removes by `Arc` pointer
//! identity, so the caller must keep the same handle it subscribed with:
//!
//! ```
//! use std::sync::Arc;
//! use taskline::{EventKind, Listener, ListenerHub};
//! use taskline::Channel;
//!
//! let hub: ListenerHub<u32> = ListenerHub::new();
//! let listener: Listener<u32> = Arc::new(|task, _err| {
//!     println!("fulfilled: {}", task.id());
//! });
//! hub.subscribe(EventKind::Fulfilled, Arc::clone(&listener));
//! hub.unsubscribe(EventKind::Fulfilled, &listener);
//! ```

use std::sync::Arc;

use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::tasks::Task;

/// A subscriber callback: receives the task view and, for failure-driven
/// kinds, the triggering attempt error.
pub type Listener<T> = Arc<dyn Fn(&Task<T>, Option<&TaskError>) + Send + Sync>;

/// Notification transport consumed by the queue engine.
///
/// Implementations decide delivery: in-place synchronous dispatch
/// ([`ListenerHub`](crate::ListenerHub)), broadcast fan-out with
/// per-listener workers ([`Bus`](crate::Bus)), or anything else with the
/// same capability set. The engine never branches on which implementation
/// is in use.
pub trait Channel<T>: Send + Sync + 'static {
    /// Delivers one event to every listener registered for its kind.
    fn publish(&self, event: Event<T>);

    /// Registers `listener` for events of `kind`.
    fn subscribe(&self, kind: EventKind, listener: Listener<T>);

    /// Removes a previously registered listener, matched by pointer
    /// identity. Unknown listeners are ignored.
    fn unsubscribe(&self, kind: EventKind, listener: &Listener<T>);
}
