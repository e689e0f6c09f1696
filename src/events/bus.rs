//! Subscription list for match events.
//!
//! Subscribers are keyed by [`SubscriberId`]. Subscribing twice with the
//! same id replaces the handler instead of adding a second one, so callers
//! can re-subscribe on reconnect without tracking whether they already did.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::event::MatchEvent;

/// Identity of an event subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub u32);

impl SubscriberId {
    /// Create a new subscriber ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscriber({})", self.0)
    }
}

/// Event callback.
pub type EventHandler = Box<dyn FnMut(&MatchEvent) + Send>;

/// Ordered, idempotent subscriber list.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, EventHandler)>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a subscriber. Returns `true` if `id` was new.
    pub fn subscribe(&mut self, id: SubscriberId, handler: impl FnMut(&MatchEvent) + Send + 'static) -> bool {
        let handler: EventHandler = Box::new(handler);
        if let Some(slot) = self.subscribers.iter_mut().find(|(sid, _)| *sid == id) {
            slot.1 = handler;
            return false;
        }
        self.subscribers.push((id, handler));
        true
    }

    /// Remove a subscriber. Returns `true` if it was present.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Is `id` subscribed?
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.subscribers.iter().any(|(sid, _)| *sid == id)
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver an event to every subscriber in subscription order.
    pub fn publish(&mut self, event: &MatchEvent) {
        trace!(kind = event.kind(), subscribers = self.subscribers.len(), "publish");
        for (_, handler) in &mut self.subscribers {
            handler(event);
        }
    }
}
