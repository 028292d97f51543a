//! The event bus capability.
//!
//! [`EventBus`] is the contract the authorizer consumes. Implementations
//! live in consumers (`warden-runtime` provides `LocalEventBus`).
//!
//! # Delivery Contract
//!
//! - Delivery is synchronous on the publishing thread unless an
//!   implementation documents otherwise; in that case it must still be
//!   at-least-once and order-preserving per subscriber.
//! - Listeners for a topic run in subscription order.
//! - Subscribing a listener whose [`ListenerId`] is already registered
//!   on the topic replaces the earlier handler in place.

use crate::{Event, Topic};
use std::sync::Arc;

/// Callback invoked for each delivered event.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Stable name of a listener.
///
/// Listener identity is by name, not by closure address, so a component
/// can re-register (e.g. after its configuration changed) and replace
/// its earlier subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(String);

impl ListenerId {
    /// Creates a listener id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named event handler.
#[derive(Clone)]
pub struct Listener {
    /// Listener name.
    pub id: ListenerId,
    /// Callback.
    pub handler: Handler,
}

impl Listener {
    /// Creates a listener from a closure.
    pub fn new<F>(id: ListenerId, handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            id,
            handler: Arc::new(handler),
        }
    }

    /// Invokes the handler.
    pub fn notify(&self, event: &Event) {
        (self.handler)(event);
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish_non_exhaustive()
    }
}

/// In-process publish/subscribe channel.
///
/// # Example
///
/// A minimal `Vec`-backed implementation:
///
/// ```
/// use std::sync::Mutex;
/// use warden_event::{Event, EventBus, Listener, ListenerId, Payload, Topic};
/// use warden_types::IdentifierCollection;
///
/// #[derive(Default)]
/// struct VecBus(Mutex<Vec<(Topic, Listener)>>);
///
/// impl EventBus for VecBus {
///     fn subscribe(&self, listener: Listener, topic: Topic) {
///         let mut subs = self.0.lock().unwrap();
///         subs.retain(|(t, l)| !(*t == topic && l.id == listener.id));
///         subs.push((topic, listener));
///     }
///     fn unsubscribe(&self, id: &ListenerId, topic: Topic) -> bool {
///         let mut subs = self.0.lock().unwrap();
///         let before = subs.len();
///         subs.retain(|(t, l)| !(*t == topic && &l.id == id));
///         before != subs.len()
///     }
///     fn is_subscribed(&self, id: &ListenerId, topic: Topic) -> bool {
///         let subs = self.0.lock().unwrap();
///         subs.iter().any(|(t, l)| *t == topic && &l.id == id)
///     }
///     fn send_message(&self, event: Event) -> usize {
///         let targets: Vec<Listener> = self.0.lock().unwrap()
///             .iter()
///             .filter(|(t, _)| *t == event.topic)
///             .map(|(_, l)| l.clone())
///             .collect();
///         targets.iter().for_each(|l| l.notify(&event));
///         targets.len()
///     }
/// }
///
/// let bus = VecBus::default();
/// let id = ListenerId::new("audit");
/// bus.subscribe(Listener::new(id.clone(), |_| {}), Topic::AuthenticationSucceeded);
/// assert!(bus.is_subscribed(&id, Topic::AuthenticationSucceeded));
///
/// let ids = IdentifierCollection::new("accounts", "alice");
/// let delivered = bus.send_message(Event::new(
///     Topic::AuthenticationSucceeded,
///     Payload::authentication(ids),
/// ));
/// assert_eq!(delivered, 1);
/// ```
pub trait EventBus: Send + Sync {
    /// Registers `listener` for `topic`, replacing a same-named listener.
    fn subscribe(&self, listener: Listener, topic: Topic);

    /// Removes the listener named `id` from `topic`.
    ///
    /// Returns `true` if a listener was removed.
    fn unsubscribe(&self, id: &ListenerId, topic: Topic) -> bool;

    /// Returns `true` if a listener named `id` is registered for `topic`.
    fn is_subscribed(&self, id: &ListenerId, topic: Topic) -> bool;

    /// Publishes `event` to every listener of its topic.
    ///
    /// Returns the number of listeners notified.
    fn send_message(&self, event: Event) -> usize;
}
