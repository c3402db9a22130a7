//! # Queue engine: state, dispatch, and the public API.
//!
//! Internal modules:
//! - [`state`]: the shared order list + record table behind one mutex;
//! - [`dispatch`]: the periodic tick loop and batch settlement;
//! - [`engine`]: the public [`TaskQueue`] surface and its builder.

mod dispatch;
mod engine;
mod state;

pub use engine::{TaskQueue, TaskQueueBuilder};
