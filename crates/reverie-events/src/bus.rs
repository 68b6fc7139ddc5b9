//! Publish/subscribe hub with bounded history.

use std::collections::{BTreeMap, VecDeque};

use futures::future::BoxFuture;
use tracing::warn;

use crate::event::Event;

/// Default bound on the event history.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Error returned by a subscriber callback.
///
/// A subscriber failure never aborts delivery; the bus logs it and moves
/// on to the remaining subscribers for the event.
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    /// The subscriber could not process the event.
    #[error("subscriber failed: {message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },
}

/// Token identifying one subscription, returned by [`EventBus::subscribe`]
/// and consumed by [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// A subscriber callback: takes an owned clone of the event and returns a
/// boxed future resolving to the delivery outcome.
pub type SubscriberFn =
    Box<dyn Fn(Event) -> BoxFuture<'static, Result<(), SubscriberError>> + Send + Sync>;

/// One registered subscription.
struct SubscriberEntry {
    /// Token handed back to the caller at subscription time.
    id: SubscriptionId,
    /// The callback itself.
    callback: SubscriberFn,
}

impl std::fmt::Debug for SubscriberEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberEntry")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Publish/subscribe hub with a bounded FIFO event history.
///
/// The bus is plain owned state: the engine constructs one and passes it
/// by reference. It is not safe for concurrent access and must live
/// behind explicit synchronization if the tick loop ever gains
/// parallelism.
#[derive(Debug)]
pub struct EventBus {
    /// Subscribers keyed by event type string, in subscription order.
    subscribers: BTreeMap<String, Vec<SubscriberEntry>>,

    /// Bounded FIFO history of published events, oldest first.
    history: VecDeque<Event>,

    /// Maximum number of events retained in the history.
    history_limit: usize,

    /// Next subscription token to hand out.
    next_id: u64,
}

impl EventBus {
    /// Create a bus with the default history bound.
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a bus with an explicit history bound.
    ///
    /// A limit of 0 disables history retention entirely.
    pub const fn with_history_limit(history_limit: usize) -> Self {
        Self {
            subscribers: BTreeMap::new(),
            history: VecDeque::new(),
            history_limit,
            next_id: 1,
        }
    }

    /// Register a callback for the given event type.
    ///
    /// Returns a [`SubscriptionId`] that can later be passed to
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(&mut self, event_type: &str, callback: SubscriberFn) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.subscribers
            .entry(event_type.to_owned())
            .or_default()
            .push(SubscriberEntry { id, callback });
        id
    }

    /// Remove a subscription by its token.
    ///
    /// Returns `true` if a subscription was removed.
    pub fn unsubscribe(&mut self, event_type: &str, id: SubscriptionId) -> bool {
        let Some(entries) = self.subscribers.get_mut(event_type) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            self.subscribers.remove(event_type);
        }
        removed
    }

    /// Publish an event: append it to the bounded history, then deliver
    /// it to every subscriber for its type, sequentially and in
    /// subscription order.
    ///
    /// A subscriber error is logged and delivery continues with the
    /// remaining subscribers.
    pub async fn publish(&mut self, event: Event) {
        self.history.push_back(event.clone());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        let Some(entries) = self.subscribers.get(&event.event_type) else {
            return;
        };

        for entry in entries {
            if let Err(err) = (entry.callback)(event.clone()).await {
                warn!(
                    event_type = %event.event_type,
                    subscription = ?entry.id,
                    error = %err,
                    "event subscriber failed, continuing delivery"
                );
            }
        }
    }

    /// Return a copy of the history, optionally filtered by event type.
    ///
    /// The returned events are clones; mutating them cannot affect the
    /// bus's own records.
    pub fn history(&self, event_type: Option<&str>) -> Vec<Event> {
        match event_type {
            Some(wanted) => self
                .history
                .iter()
                .filter(|event| event.event_type == wanted)
                .cloned()
                .collect(),
            None => self.history.iter().cloned().collect(),
        }
    }

    /// Number of events currently retained in the history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of subscriptions registered for the given event type.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscribers.get(event_type).map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::FutureExt;

    use super::*;

    /// Subscribe a callback that appends a tag to the shared log.
    fn recording_subscriber(
        bus: &mut EventBus,
        event_type: &str,
        tag: &str,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> SubscriptionId {
        let log = Arc::clone(log);
        let tag = tag.to_owned();
        bus.subscribe(
            event_type,
            Box::new(move |event| {
                let log = Arc::clone(&log);
                let tag = tag.clone();
                async move {
                    log.lock().unwrap().push(format!("{tag}:{}", event.event_type));
                    Ok(())
                }
                .boxed()
            }),
        )
    }

    fn make_event(event_type: &str) -> Event {
        Event::new(event_type, serde_json::Value::Null, "test")
    }

    #[tokio::test]
    async fn delivers_to_subscribers_in_order() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _first = recording_subscriber(&mut bus, "tick.completed", "a", &log);
        let _second = recording_subscriber(&mut bus, "tick.completed", "b", &log);

        bus.publish(make_event("tick.completed")).await;

        let entries = log.lock().unwrap().clone();
        assert_eq!(entries, vec!["a:tick.completed", "b:tick.completed"]);
    }

    #[tokio::test]
    async fn delivery_is_routed_by_type() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _sub = recording_subscriber(&mut bus, "sigil.expired", "s", &log);

        bus.publish(make_event("tick.completed")).await;
        assert!(log.lock().unwrap().is_empty());

        bus.publish(make_event("sigil.expired")).await;
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_block_the_rest() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _bad = bus.subscribe(
            "tick.completed",
            Box::new(|_event| {
                async {
                    Err(SubscriberError::Failed {
                        message: String::from("boom"),
                    })
                }
                .boxed()
            }),
        );
        let _good = recording_subscriber(&mut bus, "tick.completed", "ok", &log);

        bus.publish(make_event("tick.completed")).await;

        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let id = recording_subscriber(&mut bus, "tick.completed", "a", &log);

        assert!(bus.unsubscribe("tick.completed", id));
        assert!(!bus.unsubscribe("tick.completed", id));

        bus.publish(make_event("tick.completed")).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_bounded_and_drops_oldest() {
        let mut bus = EventBus::new();

        for i in 0..=DEFAULT_HISTORY_LIMIT {
            bus.publish(Event::new(
                "tick.completed",
                serde_json::json!({ "n": i }),
                "test",
            ))
            .await;
        }

        assert_eq!(bus.history_len(), DEFAULT_HISTORY_LIMIT);
        let history = bus.history(None);
        // The very first event (n = 0) has been trimmed.
        assert_eq!(history.first().map(|e| e.data["n"].clone()), Some(1.into()));
    }

    #[tokio::test]
    async fn history_filter_by_type() {
        let mut bus = EventBus::new();
        bus.publish(make_event("a")).await;
        bus.publish(make_event("b")).await;
        bus.publish(make_event("a")).await;

        assert_eq!(bus.history(Some("a")).len(), 2);
        assert_eq!(bus.history(Some("b")).len(), 1);
        assert_eq!(bus.history(None).len(), 3);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let mut bus = EventBus::new();
        bus.publish(make_event("nobody.listens")).await;
        assert_eq!(bus.history_len(), 1);
    }

    #[test]
    fn zero_limit_disables_history() {
        let bus = EventBus::with_history_limit(0);
        assert_eq!(bus.history_len(), 0);
    }
}
