//! In-process event bus.
//!
//! [`LocalEventBus`] keeps one ordered listener list per topic. Delivery
//! is synchronous on the publishing thread.
//!
//! ```text
//! send_message(event)
//!     │
//!     ├─ read lock ─► clone listeners of event.topic ─► unlock
//!     │
//!     └─ notify each listener in subscription order
//! ```
//!
//! Handlers run with no lock held, so a handler may itself publish or
//! subscribe without deadlocking.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace};
use warden_event::{Event, EventBus, Listener, ListenerId, Topic};

/// Synchronous, in-process [`EventBus`].
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use warden_event::{Event, EventBus, Listener, ListenerId, Payload, Topic};
/// use warden_runtime::LocalEventBus;
/// use warden_types::IdentifierCollection;
///
/// let bus = LocalEventBus::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&seen);
/// bus.subscribe(
///     Listener::new(ListenerId::new("count"), move |_| {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }),
///     Topic::AuthenticationSucceeded,
/// );
///
/// let ids = IdentifierCollection::new("accounts", "alice");
/// bus.send_message(Event::new(Topic::AuthenticationSucceeded, Payload::authentication(ids)));
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct LocalEventBus {
    listeners: RwLock<HashMap<Topic, Vec<Listener>>>,
}

impl LocalEventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners registered for `topic`.
    #[must_use]
    pub fn listener_count(&self, topic: Topic) -> usize {
        self.listeners.read().get(&topic).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for LocalEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read();
        let mut map = f.debug_map();
        for (topic, list) in listeners.iter() {
            map.entry(&topic.as_str(), &list.len());
        }
        map.finish()
    }
}

impl EventBus for LocalEventBus {
    fn subscribe(&self, listener: Listener, topic: Topic) {
        let mut listeners = self.listeners.write();
        let list = listeners.entry(topic).or_default();
        if let Some(slot) = list.iter_mut().find(|l| l.id == listener.id) {
            debug!(listener = %listener.id, %topic, "listener replaced");
            *slot = listener;
        } else {
            debug!(listener = %listener.id, %topic, "listener subscribed");
            list.push(listener);
        }
    }

    fn unsubscribe(&self, id: &ListenerId, topic: Topic) -> bool {
        let mut listeners = self.listeners.write();
        let Some(list) = listeners.get_mut(&topic) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| &l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(&topic);
        }
        if removed {
            debug!(listener = %id, %topic, "listener unsubscribed");
        }
        removed
    }

    fn is_subscribed(&self, id: &ListenerId, topic: Topic) -> bool {
        self.listeners
            .read()
            .get(&topic)
            .is_some_and(|list| list.iter().any(|l| &l.id == id))
    }

    fn send_message(&self, event: Event) -> usize {
        let targets: Vec<Listener> = self
            .listeners
            .read()
            .get(&event.topic)
            .cloned()
            .unwrap_or_default();

        trace!(topic = %event.topic, event = %event.id, listeners = targets.len(), "publishing event");
        for listener in &targets {
            listener.notify(&event);
        }
        targets.len()
    }
}
