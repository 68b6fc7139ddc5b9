//! In-process event bus for the Reverie simulation core.
//!
//! Every tick the scheduler publishes events describing what happened;
//! external tracer and visualizer collaborators subscribe by event type
//! string. The bus keeps a bounded FIFO history so late-attaching readers
//! can catch up without a persistence layer.
//!
//! # Delivery model
//!
//! Delivery is strictly sequential: `publish` awaits each subscriber for
//! the event's type in subscription order before returning. A subscriber
//! error is caught and logged per callback without aborting delivery to
//! the remaining subscribers. There is no background dispatch task and no
//! locking -- the bus is single-owner state injected into the engine.
//!
//! # Modules
//!
//! - [`event`] -- The immutable [`Event`] record.
//! - [`bus`] -- The [`EventBus`] itself.
//!
//! [`Event`]: event::Event
//! [`EventBus`]: bus::EventBus

pub mod bus;
pub mod event;

pub use bus::{DEFAULT_HISTORY_LIMIT, EventBus, SubscriberError, SubscriberFn, SubscriptionId};
pub use event::Event;
