//! # Queue notifications: data model and transports.
//!
//! This module groups the event **data model** and the **transports** used
//! to deliver one notification per task transition.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] - event classification and payload
//! - [`Channel`], [`Listener`] - the transport capability set the engine
//!   is polymorphic over
//! - [`ListenerHub`] - synchronous in-place fan-out (default transport)
//! - [`Bus`] - `tokio::sync::broadcast`-backed fan-out with per-listener
//!   workers
//!
//! ## Quick reference
//! - **Publisher**: the queue engine — one `publish` per transition.
//! - **Consumers**: listeners registered through
//!   [`TaskQueue::add_listener`](crate::TaskQueue::add_listener) (or
//!   directly on the channel), plus raw [`Bus::receiver`] consumers.

mod bus;
mod channel;
mod event;
mod hub;

#[cfg(feature = "logging")]
mod log;

pub use bus::{Bus, DEFAULT_BUS_CAPACITY};
pub use channel::{Channel, Listener};
pub use event::{Event, EventKind};
pub use hub::ListenerHub;

#[cfg(feature = "logging")]
pub use log::LogWriter;
