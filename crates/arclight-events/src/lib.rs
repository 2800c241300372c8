//! Event bus for the Arclight engine.
//!
//! Subsystems communicate through a small publish/subscribe bus: handlers
//! register for an [`EventKind`] and publishing an [`Event`] walks that
//! kind's handlers in registration order, stopping at the first one that
//! reports the event consumed.
//!
//! The bus is a plain owned value on the engine context; there is no global
//! registry.

mod bus;
mod event;

pub use bus::{EventBus, SubscriptionId};
pub use event::{Event, EventKind, MouseButton};
