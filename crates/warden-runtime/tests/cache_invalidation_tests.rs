//! Integration tests for event-driven cache invalidation.
//!
//! Lifecycle events published on the bus must reach every realm that
//! caches authorization info, exactly once, with the right identity.

use parking_lot::Mutex;
use std::sync::Arc;
use warden_auth::{AuthorizationCacheHandler, AuthzError, Permission, Realm};
use warden_event::{Event, EventBus, Payload, Topic};
use warden_runtime::config::WardenConfig;
use warden_runtime::{
    AccountAuthz, AccountStoreRealm, LocalEventBus, MemoryAccountStore, ModularRealmAuthorizer,
    SecurityManager,
};
use warden_types::{IdentifierCollection, LogicalOperator, SessionId};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Realm that records every cache clear it receives.
#[derive(Default)]
struct RecordingRealm {
    cleared: Mutex<Vec<IdentifierCollection>>,
}

impl RecordingRealm {
    fn cleared(&self) -> Vec<IdentifierCollection> {
        self.cleared.lock().clone()
    }
}

impl Realm for RecordingRealm {
    fn name(&self) -> &str {
        "recording"
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

impl AuthorizationCacheHandler for RecordingRealm {
    fn clear_cached_authorization_info(&self, identifiers: &IdentifierCollection) {
        self.cleared.lock().push(identifiers.clone());
    }
}

/// Realm without the cache-clear capability.
struct StatelessRealm;

impl Realm for StatelessRealm {
    fn name(&self) -> &str {
        "stateless"
    }

    fn is_permitted(
        &self,
        _identifiers: &IdentifierCollection,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, bool)>, AuthzError> {
        Ok(permissions.iter().map(|p| (p.clone(), true)).collect())
    }

    fn has_role(
        &self,
        _identifiers: &IdentifierCollection,
        role_ids: &[String],
    ) -> Result<Vec<(String, bool)>, AuthzError> {
        Ok(role_ids.iter().map(|r| (r.clone(), true)).collect())
    }
}

fn alice() -> IdentifierCollection {
    IdentifierCollection::new("accounts", "alice")
}

fn bob() -> IdentifierCollection {
    IdentifierCollection::new("accounts", "bob")
}

fn p(text: &str) -> Permission {
    Permission::parse(text).expect("valid permission")
}

struct Fixture {
    bus: Arc<LocalEventBus>,
    first: Arc<RecordingRealm>,
    second: Arc<RecordingRealm>,
    _authorizer: ModularRealmAuthorizer,
}

fn fixture() -> Fixture {
    let bus = Arc::new(LocalEventBus::new());
    let first = Arc::new(RecordingRealm::default());
    let second = Arc::new(RecordingRealm::default());

    let mut authorizer = ModularRealmAuthorizer::new();
    authorizer.set_realms([
        first.clone() as Arc<dyn Realm>,
        Arc::new(StatelessRealm) as Arc<dyn Realm>,
        second.clone() as Arc<dyn Realm>,
    ]);
    authorizer.set_event_bus(bus.clone());

    Fixture {
        bus,
        first,
        second,
        _authorizer: authorizer,
    }
}

// =============================================================================
// Fan-out
// =============================================================================

#[test]
fn session_stop_clears_each_capable_realm_once() {
    let fx = fixture();

    let delivered = fx.bus.send_message(Event::new(
        Topic::SessionStop,
        Payload::session(SessionId::new(), alice()),
    ));

    assert_eq!(delivered, 1);
    assert_eq!(fx.first.cleared(), [alice()]);
    assert_eq!(fx.second.cleared(), [alice()]);
}

#[test]
fn session_expire_and_authentication_clear_too() {
    let fx = fixture();

    fx.bus.send_message(Event::new(
        Topic::SessionExpire,
        Payload::session(SessionId::new(), alice()),
    ));
    fx.bus.send_message(Event::new(
        Topic::AuthenticationSucceeded,
        Payload::authentication(bob()),
    ));

    assert_eq!(fx.first.cleared(), [alice(), bob()]);
    assert_eq!(fx.second.cleared(), [alice(), bob()]);
}

#[test]
fn authorization_topics_do_not_clear() {
    let fx = fixture();
    fx.bus.send_message(Event::new(
        Topic::AuthorizationGranted,
        Payload::authorization(alice(), Vec::new(), Some(LogicalOperator::All)),
    ));
    assert!(fx.first.cleared().is_empty());
}

#[test]
fn mismatched_payload_is_ignored() {
    let fx = fixture();
    fx.bus.send_message(Event::new(Topic::SessionStop, Payload::authentication(alice())));
    fx.bus.send_message(Event::new(
        Topic::AuthenticationSucceeded,
        Payload::session(SessionId::new(), alice()),
    ));
    assert!(fx.first.cleared().is_empty());
}

#[test]
fn replacing_realms_does_not_duplicate_listeners() {
    let bus = Arc::new(LocalEventBus::new());
    let old = Arc::new(RecordingRealm::default());
    let new = Arc::new(RecordingRealm::default());

    let mut authorizer = ModularRealmAuthorizer::new();
    authorizer.set_event_bus(bus.clone());
    authorizer.set_realms([old.clone() as Arc<dyn Realm>]);
    authorizer.set_realms([new.clone() as Arc<dyn Realm>]);

    assert_eq!(bus.listener_count(Topic::SessionStop), 1);
    bus.send_message(Event::new(
        Topic::SessionStop,
        Payload::session(SessionId::new(), alice()),
    ));

    assert!(old.cleared().is_empty());
    assert_eq!(new.cleared(), [alice()]);
}

// =============================================================================
// End to end with the account realm
// =============================================================================

#[test]
fn account_change_visible_after_reauthentication() {
    let store = Arc::new(
        MemoryAccountStore::new().with_account("alice", AccountAuthz::new(["viewer"], ["doc:read"])),
    );
    let realm = Arc::new(AccountStoreRealm::new("accounts", store.clone()));
    let manager = SecurityManager::new([realm.clone() as Arc<dyn Realm>]).with_log_results(false);

    assert!(!manager.is_permitted_all(&alice(), &[p("doc:write")]).expect("check"));
    assert!(realm.is_cached("alice"));

    // The store changes, the realm still answers from its cache.
    store.insert("alice", AccountAuthz::new(["editor"], ["doc:read,write"]));
    assert!(!manager.is_permitted_all(&alice(), &[p("doc:write")]).expect("check"));

    manager.authentication_succeeded(alice());
    assert!(!realm.is_cached("alice"));
    assert!(manager.is_permitted_all(&alice(), &[p("doc:write")]).expect("check"));
    assert!(manager.has_all_roles(&alice(), &["editor".to_string()]).expect("check"));
}

#[test]
fn session_end_from_config_built_manager() {
    let config = WardenConfig::from_toml(
        r#"
[[realms]]
name = "accounts"
[realms.accounts.alice]
permissions = ["doc:*"]

[[realms]]
name = "partners"
[realms.accounts.alice]
roles = ["partner"]
"#,
    )
    .expect("parse");
    let manager = SecurityManager::from_config(&config).expect("build");

    manager.check_permission(&alice(), &[p("doc:read")]).expect("granted");
    manager
        .check_role(&alice(), &["partner".to_string()])
        .expect("granted");

    // One listener per topic regardless of how many realms there are.
    assert_eq!(manager.session_stopped(SessionId::new(), alice()), 1);
    assert_eq!(manager.session_expired(SessionId::new(), bob()), 1);
}
