//! Multi-realm authorizer.
//!
//! [`ModularRealmAuthorizer`] fans every check out to all configured
//! realms, ORs the per-item verdicts across realms, then applies the
//! caller's [`LogicalOperator`] across items.
//!
//! ```text
//! is_permitted_collective(ids, [p1, p2], All)
//!     │
//!     ├─ realm A ─► [(p1, false), (p2, true)]
//!     ├─ realm B ─► [(p1, true),  (p2, false)]
//!     │
//!     ├─ OR per item ─► [(p1, true), (p2, true)]
//!     ├─ All          ─► true
//!     └─ publish AUTHORIZATION.GRANTED
//! ```
//!
//! # Cache Invalidation
//!
//! Once both realms and an event bus are present, the authorizer
//! subscribes two listeners:
//!
//! | Listener | Topics | Action |
//! |----------|--------|--------|
//! | [`SESSION_CACHE_LISTENER`] | `SESSION.STOP`, `SESSION.EXPIRE` | clear the session's identity in every caching realm |
//! | [`AUTHC_CACHE_LISTENER`] | `AUTHENTICATION.SUCCEEDED` | clear the authenticated identity in every caching realm |
//!
//! Listener ids are stable, so replacing the realms re-registers the
//! listeners in place instead of stacking a second copy.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_auth::{AuthzError, ItemKind, Permission, Realm};
use warden_event::{
    AuthzItem, Event, EventBus, EventError, Listener, ListenerId, Payload, SessionPayload, Topic,
};
use warden_types::{IdentifierCollection, LogicalOperator};

/// Listener id for the session-end cache clear.
pub const SESSION_CACHE_LISTENER: &str = "authorizer.session_clears_cache";

/// Listener id for the authentication cache clear.
pub const AUTHC_CACHE_LISTENER: &str = "authorizer.authc_clears_cache";

type Realms = Arc<[Arc<dyn Realm>]>;

/// Aggregates authorization decisions across realms.
#[derive(Clone, Default)]
pub struct ModularRealmAuthorizer {
    realms: Option<Realms>,
    event_bus: Option<Arc<dyn EventBus>>,
}

impl std::fmt::Debug for ModularRealmAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.realms().iter().map(|r| r.name()).collect();
        f.debug_struct("ModularRealmAuthorizer")
            .field("realms", &names)
            .field("event_bus", &self.event_bus.is_some())
            .finish()
    }
}

impl ModularRealmAuthorizer {
    /// Creates an authorizer with no realms and no event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured realms, in consultation order.
    #[must_use]
    pub fn realms(&self) -> &[Arc<dyn Realm>] {
        self.realms.as_deref().unwrap_or_default()
    }

    /// The injected event bus, if any.
    #[must_use]
    pub fn event_bus(&self) -> Option<&Arc<dyn EventBus>> {
        self.event_bus.as_ref()
    }

    /// Replaces the realms.
    ///
    /// Re-registers the cache-clear listeners when an event bus is set.
    pub fn set_realms<I>(&mut self, realms: I)
    where
        I: IntoIterator<Item = Arc<dyn Realm>>,
    {
        let realms: Realms = realms.into_iter().collect();
        debug!(count = realms.len(), "realms configured");
        self.realms = Some(realms);
        if let Some(bus) = &self.event_bus {
            self.subscribe_cache_clear(bus.as_ref());
        }
    }

    /// Replaces the event bus.
    ///
    /// Listeners registered on a previous bus are removed from it. When
    /// realms are already set, the cache-clear listeners are registered
    /// on the new bus.
    pub fn set_event_bus(&mut self, event_bus: Arc<dyn EventBus>) {
        if let Some(previous) = self.event_bus.take() {
            unsubscribe_cache_clear(previous.as_ref());
        }
        if self.realms.is_some() {
            self.subscribe_cache_clear(event_bus.as_ref());
        }
        self.event_bus = Some(event_bus);
    }

    /// Fails unless at least one realm is configured.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::RealmsNotConfigured`].
    pub fn assert_realms_configured(&self) -> Result<&[Arc<dyn Realm>], AuthzError> {
        match self.realms.as_deref() {
            Some(realms) if !realms.is_empty() => Ok(realms),
            _ => Err(AuthzError::RealmsNotConfigured),
        }
    }

    // === Permissions ===

    /// Per-item permission verdicts, ORed across realms.
    ///
    /// One pair per distinct requested permission, in first-occurrence
    /// order. With `log_results`, one `AUTHORIZATION.RESULTS` event is
    /// published per pair.
    ///
    /// # Errors
    ///
    /// - [`AuthzError::RealmsNotConfigured`] before any realm is consulted
    /// - the first realm error, unmodified; later realms are skipped
    /// - [`AuthzError::EventBusNotConfigured`] if `log_results` is set
    ///   without a bus
    pub fn is_permitted(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
        log_results: bool,
    ) -> Result<Vec<(Permission, bool)>, AuthzError> {
        let realms = self.assert_realms_configured()?;
        let verdicts = fan_out(realms, |realm| realm.is_permitted(identifiers, permissions))?;
        let results = reduce_any(verdicts);
        if log_results {
            self.log_results(identifiers, &results)?;
        }
        Ok(results)
    }

    /// Applies `logical_operator` across the verdicts of [`Self::is_permitted`].
    ///
    /// Always publishes one `AUTHORIZATION.GRANTED` or
    /// `AUTHORIZATION.DENIED` event.
    ///
    /// # Errors
    ///
    /// As [`Self::is_permitted`], plus [`AuthzError::EventBusNotConfigured`].
    pub fn is_permitted_collective(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
        logical_operator: LogicalOperator,
    ) -> Result<bool, AuthzError> {
        let results = self.is_permitted(identifiers, permissions, false)?;
        let items: Vec<String> = permissions.iter().map(ToString::to_string).collect();
        self.collective(identifiers, &results, items, logical_operator)
    }

    /// Succeeds silently if the collective permission check passes.
    ///
    /// # Errors
    ///
    /// [`AuthzError::Unauthorized`] if the check fails, or any error of
    /// [`Self::is_permitted_collective`].
    pub fn check_permission(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
        logical_operator: LogicalOperator,
    ) -> Result<(), AuthzError> {
        if self.is_permitted_collective(identifiers, permissions, logical_operator)? {
            return Ok(());
        }
        Err(AuthzError::Unauthorized {
            identifiers: identifiers.clone(),
            kind: ItemKind::Permission,
            items: permissions.iter().map(ToString::to_string).collect(),
            logical_operator,
        })
    }

    // === Roles ===

    /// Per-item role verdicts, ORed across realms.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::is_permitted`].
    pub fn has_role(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
        log_results: bool,
    ) -> Result<Vec<(String, bool)>, AuthzError> {
        let realms = self.assert_realms_configured()?;
        let verdicts = fan_out(realms, |realm| realm.has_role(identifiers, role_ids))?;
        let results = reduce_any(verdicts);
        if log_results {
            self.log_results(identifiers, &results)?;
        }
        Ok(results)
    }

    /// Applies `logical_operator` across the verdicts of [`Self::has_role`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::is_permitted_collective`].
    pub fn has_role_collective(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
        logical_operator: LogicalOperator,
    ) -> Result<bool, AuthzError> {
        let results = self.has_role(identifiers, role_ids, false)?;
        self.collective(identifiers, &results, role_ids.to_vec(), logical_operator)
    }

    /// Succeeds silently if the collective role check passes.
    ///
    /// # Errors
    ///
    /// [`AuthzError::Unauthorized`] if the check fails, or any error of
    /// [`Self::has_role_collective`].
    pub fn check_role(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
        logical_operator: LogicalOperator,
    ) -> Result<(), AuthzError> {
        if self.has_role_collective(identifiers, role_ids, logical_operator)? {
            return Ok(());
        }
        Err(AuthzError::Unauthorized {
            identifiers: identifiers.clone(),
            kind: ItemKind::Role,
            items: role_ids.to_vec(),
            logical_operator,
        })
    }

    // === Cache invalidation ===

    /// Subscribes the cache-clear listeners on the event bus.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::EventBusNotConfigured`].
    pub fn register_cache_clear_listener(&self) -> Result<(), AuthzError> {
        let bus = self
            .event_bus
            .as_ref()
            .ok_or(AuthzError::EventBusNotConfigured)?;
        self.subscribe_cache_clear(bus.as_ref());
        Ok(())
    }

    /// Clears the session's identity in every caching realm.
    ///
    /// Returns the number of realms cleared.
    pub fn session_clears_cache(&self, session: &SessionPayload) -> usize {
        clear_realm_caches(self.realms(), &session.identifier)
    }

    /// Clears `identifier` in every caching realm.
    ///
    /// Returns the number of realms cleared.
    pub fn authc_clears_cache(&self, identifier: &IdentifierCollection) -> usize {
        clear_realm_caches(self.realms(), identifier)
    }

    /// Publishes an authorization event.
    ///
    /// Returns the number of listeners notified.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::EventBusNotConfigured`] if no bus is set.
    pub fn notify_event(
        &self,
        identifiers: &IdentifierCollection,
        items: Vec<AuthzItem>,
        topic: Topic,
        logical_operator: Option<LogicalOperator>,
    ) -> Result<usize, AuthzError> {
        let bus = self
            .event_bus
            .as_ref()
            .ok_or(AuthzError::EventBusNotConfigured)?;
        let payload = Payload::authorization(identifiers.clone(), items, logical_operator);
        Ok(bus.send_message(Event::new(topic, payload)))
    }

    fn log_results<T: std::fmt::Display>(
        &self,
        identifiers: &IdentifierCollection,
        results: &[(T, bool)],
    ) -> Result<(), AuthzError> {
        for (item, granted) in results {
            let items = vec![AuthzItem::with_verdict(item.to_string(), *granted)];
            self.notify_event(identifiers, items, Topic::AuthorizationResults, None)?;
        }
        Ok(())
    }

    fn collective<T>(
        &self,
        identifiers: &IdentifierCollection,
        results: &[(T, bool)],
        requested: Vec<String>,
        logical_operator: LogicalOperator,
    ) -> Result<bool, AuthzError> {
        let granted = logical_operator.apply(results.iter().map(|(_, g)| *g));
        let topic = if granted {
            Topic::AuthorizationGranted
        } else {
            Topic::AuthorizationDenied
        };
        debug!(
            identity = %identifiers,
            operator = %logical_operator,
            items = requested.len(),
            granted,
            "collective check"
        );
        let items = requested.into_iter().map(AuthzItem::requested).collect();
        self.notify_event(identifiers, items, topic, Some(logical_operator))?;
        Ok(granted)
    }

    fn subscribe_cache_clear(&self, bus: &dyn EventBus) {
        let realms: Realms = self.realms.clone().unwrap_or_else(|| Arc::from(Vec::new()));

        let session_realms = Arc::clone(&realms);
        let session_listener = Listener::new(ListenerId::new(SESSION_CACHE_LISTENER), move |event| {
            match event.payload.as_session() {
                Some(session) => {
                    clear_realm_caches(&session_realms, &session.identifier);
                }
                None => {
                    let err = EventError::PayloadMismatch {
                        topic: event.topic.to_string(),
                        expected: "session",
                    };
                    warn!(error = %err, received = event.payload.kind(), "session cache clear skipped");
                }
            }
        });
        bus.subscribe(session_listener.clone(), Topic::SessionStop);
        bus.subscribe(session_listener, Topic::SessionExpire);

        let authc_listener = Listener::new(ListenerId::new(AUTHC_CACHE_LISTENER), move |event| {
            match &event.payload {
                Payload::Authentication { identifier } => {
                    clear_realm_caches(&realms, identifier);
                }
                other => {
                    let err = EventError::PayloadMismatch {
                        topic: event.topic.to_string(),
                        expected: "authentication",
                    };
                    warn!(error = %err, received = other.kind(), "authentication cache clear skipped");
                }
            }
        });
        bus.subscribe(authc_listener, Topic::AuthenticationSucceeded);

        debug!("cache clear listeners registered");
    }
}

fn unsubscribe_cache_clear(bus: &dyn EventBus) {
    let session = ListenerId::new(SESSION_CACHE_LISTENER);
    bus.unsubscribe(&session, Topic::SessionStop);
    bus.unsubscribe(&session, Topic::SessionExpire);
    bus.unsubscribe(&ListenerId::new(AUTHC_CACHE_LISTENER), Topic::AuthenticationSucceeded);
}

/// Runs `query` against each realm in order, concatenating the verdicts.
///
/// Stops at the first realm error.
fn fan_out<T, F>(realms: &[Arc<dyn Realm>], mut query: F) -> Result<Vec<(T, bool)>, AuthzError>
where
    F: FnMut(&dyn Realm) -> Result<Vec<(T, bool)>, AuthzError>,
{
    let mut verdicts = Vec::new();
    for realm in realms {
        let mut found = query(realm.as_ref()).map_err(|e| {
            warn!(realm = realm.name(), error = %e, "realm check failed");
            e
        })?;
        verdicts.append(&mut found);
    }
    Ok(verdicts)
}

/// ORs verdicts per distinct item, keeping first-occurrence order.
fn reduce_any<T: Eq + Hash + Clone>(verdicts: Vec<(T, bool)>) -> Vec<(T, bool)> {
    let mut positions: HashMap<T, usize> = HashMap::new();
    let mut reduced: Vec<(T, bool)> = Vec::new();
    for (item, granted) in verdicts {
        match positions.get(&item) {
            Some(&index) => reduced[index].1 |= granted,
            None => {
                positions.insert(item.clone(), reduced.len());
                reduced.push((item, granted));
            }
        }
    }
    reduced
}

fn clear_realm_caches(realms: &[Arc<dyn Realm>], identifier: &IdentifierCollection) -> usize {
    let mut cleared = 0;
    for realm in realms {
        if let Some(handler) = realm.cache_handler() {
            handler.clear_cached_authorization_info(identifier);
            cleared += 1;
        }
    }
    debug!(identity = %identifier, realms = cleared, "authorization caches cleared");
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalEventBus;
    use parking_lot::Mutex;
    use warden_auth::AuthorizationCacheHandler;
    use warden_types::SessionId;

    /// Realm answering every item with a fixed verdict.
    struct Fixed {
        name: &'static str,
        verdict: bool,
    }

    impl Realm for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn is_permitted(
            &self,
            _identifiers: &IdentifierCollection,
            permissions: &[Permission],
        ) -> Result<Vec<(Permission, bool)>, AuthzError> {
            Ok(permissions.iter().map(|p| (p.clone(), self.verdict)).collect())
        }

        fn has_role(
            &self,
            _identifiers: &IdentifierCollection,
            role_ids: &[String],
        ) -> Result<Vec<(String, bool)>, AuthzError> {
            Ok(role_ids.iter().map(|r| (r.clone(), self.verdict)).collect())
        }
    }

    #[derive(Default)]
    struct Caching {
        cleared: Mutex<Vec<IdentifierCollection>>,
    }

    impl Realm for Caching {
        fn name(&self) -> &str {
            "caching"
        }

        fn is_permitted(
            &self,
            _identifiers: &IdentifierCollection,
            permissions: &[Permission],
        ) -> Result<Vec<(Permission, bool)>, AuthzError> {
            Ok(permissions.iter().map(|p| (p.clone(), false)).collect())
        }

        fn has_role(
            &self,
            _identifiers: &IdentifierCollection,
            role_ids: &[String],
        ) -> Result<Vec<(String, bool)>, AuthzError> {
            Ok(role_ids.iter().map(|r| (r.clone(), false)).collect())
        }

        fn cache_handler(&self) -> Option<&dyn AuthorizationCacheHandler> {
            Some(self)
        }
    }

    impl AuthorizationCacheHandler for Caching {
        fn clear_cached_authorization_info(&self, identifiers: &IdentifierCollection) {
            self.cleared.lock().push(identifiers.clone());
        }
    }

    fn alice() -> IdentifierCollection {
        IdentifierCollection::new("accounts", "alice")
    }

    fn p(text: &str) -> Permission {
        Permission::parse(text).expect("valid permission")
    }

    fn fixed(name: &'static str, verdict: bool) -> Arc<dyn Realm> {
        Arc::new(Fixed { name, verdict })
    }

    #[test]
    fn reduce_any_keeps_first_occurrence_order() {
        let reduced = reduce_any(vec![("b", false), ("a", false), ("b", true), ("a", false)]);
        assert_eq!(reduced, [("b", true), ("a", false)]);
    }

    #[test]
    fn no_realms_is_an_error() {
        let authorizer = ModularRealmAuthorizer::new();
        let err = authorizer
            .is_permitted(&alice(), &[p("doc:read")], false)
            .expect_err("no realms");
        assert!(matches!(err, AuthzError::RealmsNotConfigured));

        let mut empty = ModularRealmAuthorizer::new();
        empty.set_realms(Vec::new());
        assert!(empty.assert_realms_configured().is_err());
    }

    #[test]
    fn or_across_realms() {
        let mut authorizer = ModularRealmAuthorizer::new();
        authorizer.set_realms([fixed("deny", false), fixed("grant", true)]);

        let results = authorizer
            .is_permitted(&alice(), &[p("doc:read"), p("doc:read")], false)
            .expect("check");
        assert_eq!(results, [(p("doc:read"), true)]);

        let roles = authorizer
            .has_role(&alice(), &["admin".to_string()], false)
            .expect("check");
        assert_eq!(roles, [("admin".to_string(), true)]);
    }

    #[test]
    fn log_results_without_bus_fails() {
        let mut authorizer = ModularRealmAuthorizer::new();
        authorizer.set_realms([fixed("grant", true)]);
        let err = authorizer
            .is_permitted(&alice(), &[p("doc:read")], true)
            .expect_err("no bus");
        assert!(matches!(err, AuthzError::EventBusNotConfigured));
    }

    #[test]
    fn direct_cache_clear_counts_capable_realms() {
        let caching = Arc::new(Caching::default());
        let mut authorizer = ModularRealmAuthorizer::new();
        authorizer.set_realms([fixed("plain", true), caching.clone() as Arc<dyn Realm>]);

        assert_eq!(authorizer.authc_clears_cache(&alice()), 1);
        let session = SessionPayload {
            session_id: SessionId::new(),
            identifier: alice(),
        };
        assert_eq!(authorizer.session_clears_cache(&session), 1);
        assert_eq!(caching.cleared.lock().len(), 2);
    }

    #[test]
    fn listeners_registered_once_realms_and_bus_present() {
        let bus = Arc::new(LocalEventBus::new());
        let mut authorizer = ModularRealmAuthorizer::new();
        authorizer.set_event_bus(bus.clone());
        let session = ListenerId::new(SESSION_CACHE_LISTENER);
        assert!(!bus.is_subscribed(&session, Topic::SessionStop));

        authorizer.set_realms([fixed("grant", true)]);
        authorizer.set_realms([fixed("grant", true)]);

        assert!(bus.is_subscribed(&session, Topic::SessionStop));
        assert!(bus.is_subscribed(&session, Topic::SessionExpire));
        assert!(bus.is_subscribed(
            &ListenerId::new(AUTHC_CACHE_LISTENER),
            Topic::AuthenticationSucceeded
        ));
        assert_eq!(bus.listener_count(Topic::SessionStop), 1);
    }

    #[test]
    fn replacing_bus_moves_listeners() {
        let old = Arc::new(LocalEventBus::new());
        let new = Arc::new(LocalEventBus::new());
        let mut authorizer = ModularRealmAuthorizer::new();
        authorizer.set_realms([fixed("grant", true)]);
        authorizer.set_event_bus(old.clone());
        assert_eq!(old.listener_count(Topic::AuthenticationSucceeded), 1);

        authorizer.set_event_bus(new.clone());
        assert_eq!(old.listener_count(Topic::AuthenticationSucceeded), 0);
        assert_eq!(new.listener_count(Topic::AuthenticationSucceeded), 1);
    }

    #[test]
    fn register_without_bus_fails() {
        let authorizer = ModularRealmAuthorizer::new();
        assert!(matches!(
            authorizer.register_cache_clear_listener(),
            Err(AuthzError::EventBusNotConfigured)
        ));
    }

    #[test]
    fn debug_shows_realm_names() {
        let mut authorizer = ModularRealmAuthorizer::new();
        authorizer.set_realms([fixed("ldap", true)]);
        let debug = format!("{authorizer:?}");
        assert!(debug.contains("ldap"), "got: {debug}");
    }
}
