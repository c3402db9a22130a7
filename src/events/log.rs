//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] prints every queue notification to stdout in a
//! human-readable format.
//!
//! ## Output format
//! ```text
//! [enqueue] task=report id=6f9c…
//! [dequeue] task=report id=6f9c…
//! [retry] task=report id=6f9c… err="execution failed: boom"
//! [fulfilled] task=report id=6f9c…
//! ```

use std::sync::Arc;

use crate::events::channel::{Channel, Listener};
use crate::events::EventKind;

/// Stdout logging hook, enabled via the `logging` feature.
///
/// Not intended for production use - register your own listeners for
/// structured logging or metrics collection.
pub struct LogWriter;

impl LogWriter {
    /// All kinds the writer reports on.
    const KINDS: [EventKind; 7] = [
        EventKind::Enqueue,
        EventKind::Dequeue,
        EventKind::Pause,
        EventKind::Resume,
        EventKind::Fulfilled,
        EventKind::Rejected,
        EventKind::Retry,
    ];

    /// Subscribes a println listener for every event kind.
    pub fn attach<T: Send + Sync + 'static>(channel: &dyn Channel<T>) {
        for kind in Self::KINDS {
            let listener: Listener<T> = Arc::new(move |task, error| {
                let name = task.name().unwrap_or("<unnamed>");
                match error {
                    Some(err) => println!(
                        "[{}] task={name} id={} err={:?}",
                        kind.as_label(),
                        task.id(),
                        err.to_string()
                    ),
                    None => println!("[{}] task={name} id={}", kind.as_label(), task.id()),
                }
            });
            channel.subscribe(kind, listener);
        }
    }
}
