//! The immutable event record published on the bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event published on the [`EventBus`].
///
/// Events are immutable once published: the bus hands out clones, never
/// references into its history.
///
/// [`EventBus`]: crate::bus::EventBus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event id.
    pub id: Uuid,

    /// Event type string used for subscription routing
    /// (e.g. `"tick.completed"`, `"sigil.expired"`).
    pub event_type: String,

    /// Free-form JSON payload.
    pub data: serde_json::Value,

    /// Wall-clock time the event was created.
    pub timestamp: DateTime<Utc>,

    /// Name of the component that published the event.
    pub source: String,
}

impl Event {
    /// Create a new event with a fresh id and the current timestamp.
    pub fn new(event_type: &str, data: serde_json::Value, source: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            data,
            timestamp: Utc::now(),
            source: source.to_owned(),
        }
    }
}
