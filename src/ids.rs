//! # Task identity and its supplier.
//!
//! Every task gets exactly one [`TaskId`] at enqueue time, minted by an
//! [`IdSupplier`]. The supplier is an external collaborator of the queue:
//! the engine never assumes anything about the shape of the ids beyond
//! uniqueness, and tests can inject a deterministic supplier.

use std::fmt;

use uuid::Uuid;

/// Opaque unique identifier of a task.
///
/// Assigned once at enqueue, immutable afterwards. Two tasks never share
/// an id as long as the supplier honors its uniqueness contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Returns the underlying uuid.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TaskId {
    fn from(value: Uuid) -> Self {
        TaskId(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Supplier of globally unique task identifiers.
///
/// Implementations must return a fresh id on every call.
pub trait IdSupplier: Send + Sync + 'static {
    /// Mints a new unique id.
    fn generate(&self) -> TaskId;
}

/// Default supplier backed by random (v4) uuids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSupplier for UuidIds {
    fn generate(&self) -> TaskId {
        TaskId(Uuid::new_v4())
    }
}
