//! Account-store realm with a lazily filled authorization cache.

use super::AccountStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};
use warden_auth::{
    AuthorizationCacheHandler, AuthzError, IndexedAuthorizationInfo, IndexedPermissionVerifier,
    Permission, PermissionVerifier, Realm, RoleVerifier, SimpleRoleVerifier,
};
use warden_types::IdentifierCollection;

/// Store lookups per cache miss when evictions keep racing the load.
const LOAD_ATTEMPTS: usize = 2;

#[derive(Default)]
struct AuthzCache {
    entries: HashMap<String, Arc<IndexedAuthorizationInfo>>,
    /// Bumped on every eviction, cached or not.
    generation: u64,
}

/// Realm backed by an [`AccountStore`].
///
/// The first check for an identity loads its record from the store and
/// caches the indexed form under the primary identifier. Later checks
/// hit the cache until [`AuthorizationCacheHandler`] evicts the entry.
/// Unknown accounts are not cached and are denied every item.
///
/// An eviction that lands while a load is in flight wins: the loaded
/// snapshot is discarded and the store is read again.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_auth::{Permission, Realm};
/// use warden_runtime::{AccountAuthz, AccountStoreRealm, MemoryAccountStore};
/// use warden_types::IdentifierCollection;
///
/// let store = MemoryAccountStore::new()
///     .with_account("alice", AccountAuthz::new(["editor"], ["doc:read,write"]));
/// let realm = AccountStoreRealm::new("accounts", Arc::new(store));
///
/// let alice = IdentifierCollection::new("accounts", "alice");
/// let write: Permission = "doc:write".parse()?;
/// assert_eq!(realm.is_permitted(&alice, &[write.clone()])?, [(write, true)]);
/// assert!(realm.is_cached("alice"));
/// # Ok::<(), warden_auth::AuthzError>(())
/// ```
pub struct AccountStoreRealm {
    name: String,
    store: Arc<dyn AccountStore>,
    permission_verifier: Box<dyn PermissionVerifier>,
    role_verifier: Box<dyn RoleVerifier>,
    cache: RwLock<AuthzCache>,
}

impl AccountStoreRealm {
    /// Creates a realm with the default verifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, store: Arc<dyn AccountStore>) -> Self {
        Self {
            name: name.into(),
            store,
            permission_verifier: Box::new(IndexedPermissionVerifier::new()),
            role_verifier: Box::new(SimpleRoleVerifier::new()),
            cache: RwLock::new(AuthzCache::default()),
        }
    }

    /// Replaces the permission verifier.
    #[must_use]
    pub fn with_permission_verifier(mut self, verifier: impl PermissionVerifier + 'static) -> Self {
        self.permission_verifier = Box::new(verifier);
        self
    }

    /// Replaces the role verifier.
    #[must_use]
    pub fn with_role_verifier(mut self, verifier: impl RoleVerifier + 'static) -> Self {
        self.role_verifier = Box::new(verifier);
        self
    }

    /// Returns `true` if `identifier` has cached authorization info.
    #[must_use]
    pub fn is_cached(&self, identifier: &str) -> bool {
        self.cache.read().entries.contains_key(identifier)
    }

    /// Number of cached identities.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.read().entries.len()
    }

    /// Authorization info for `identifiers`, loading it on a cache miss.
    ///
    /// `None` for an anonymous collection or an unknown account.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub fn get_authorization_info(
        &self,
        identifiers: &IdentifierCollection,
    ) -> Result<Option<Arc<IndexedAuthorizationInfo>>, AuthzError> {
        let Some(identifier) = identifiers.primary_identifier() else {
            debug!(realm = %self.name, "no primary identifier, nothing to authorize");
            return Ok(None);
        };

        for attempt in 1..=LOAD_ATTEMPTS {
            let generation = {
                let cache = self.cache.read();
                if let Some(info) = cache.entries.get(identifier) {
                    trace!(realm = %self.name, identifier, "authorization cache hit");
                    return Ok(Some(Arc::clone(info)));
                }
                cache.generation
            };

            let Some(account) = self.store.get_authz_info(identifier)? else {
                debug!(realm = %self.name, identifier, "account not found");
                return Ok(None);
            };
            let info = Arc::new(account.to_authz_info());

            let mut cache = self.cache.write();
            if cache.generation == generation {
                cache
                    .entries
                    .insert(identifier.to_string(), Arc::clone(&info));
                drop(cache);
                debug!(
                    realm = %self.name,
                    identifier,
                    roles = info.roles().len(),
                    "authorization info cached"
                );
                return Ok(Some(info));
            }
            drop(cache);

            if attempt == LOAD_ATTEMPTS {
                debug!(realm = %self.name, identifier, "evicted during load, answering uncached");
                return Ok(Some(info));
            }
            debug!(realm = %self.name, identifier, "evicted during load, reloading");
        }
        Ok(None)
    }
}

impl std::fmt::Debug for AccountStoreRealm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStoreRealm")
            .field("name", &self.name)
            .field("cached", &self.cached_count())
            .finish_non_exhaustive()
    }
}

impl Realm for AccountStoreRealm {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_permitted(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, bool)>, AuthzError> {
        match self.get_authorization_info(identifiers)? {
            Some(info) => self.permission_verifier.is_permitted(&info, permissions),
            None => Ok(permissions.iter().map(|p| (p.clone(), false)).collect()),
        }
    }

    fn has_role(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
    ) -> Result<Vec<(String, bool)>, AuthzError> {
        match self.get_authorization_info(identifiers)? {
            Some(info) => Ok(self.role_verifier.has_role(&info, role_ids)),
            None => Ok(role_ids.iter().map(|r| (r.clone(), false)).collect()),
        }
    }

    fn cache_handler(&self) -> Option<&dyn AuthorizationCacheHandler> {
        Some(self)
    }
}

impl AuthorizationCacheHandler for AccountStoreRealm {
    fn clear_cached_authorization_info(&self, identifiers: &IdentifierCollection) {
        let Some(identifier) = identifiers.primary_identifier() else {
            return;
        };
        let mut cache = self.cache.write();
        cache.generation += 1;
        if cache.entries.remove(identifier).is_some() {
            debug!(realm = %self.name, identifier, "authorization cache evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::{AccountAuthz, MemoryAccountStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that counts lookups and can be made to fail.
    struct CountingStore {
        inner: MemoryAccountStore,
        lookups: AtomicUsize,
        fail: bool,
    }

    impl AccountStore for CountingStore {
        fn get_authz_info(&self, identifier: &str) -> Result<Option<AccountAuthz>, AuthzError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthzError::realm("counting", "authority offline"));
            }
            self.inner.get_authz_info(identifier)
        }
    }

    fn store(fail: bool) -> Arc<CountingStore> {
        Arc::new(CountingStore {
            inner: MemoryAccountStore::new().with_account(
                "alice",
                AccountAuthz::new(["editor"], ["doc:read,write", "report:*:7"]),
            ),
            lookups: AtomicUsize::new(0),
            fail,
        })
    }

    fn alice() -> IdentifierCollection {
        IdentifierCollection::new("accounts", "alice")
    }

    fn p(text: &str) -> Permission {
        Permission::parse(text).expect("valid permission")
    }

    #[test]
    fn lazy_load_then_cache_hit() {
        let store = store(false);
        let realm = AccountStoreRealm::new("accounts", store.clone());

        let first = realm
            .is_permitted(&alice(), &[p("doc:write"), p("doc:delete")])
            .expect("check");
        assert_eq!(first, [(p("doc:write"), true), (p("doc:delete"), false)]);

        let roles = realm
            .has_role(&alice(), &["editor".to_string(), "admin".to_string()])
            .expect("check");
        assert_eq!(roles, [("editor".to_string(), true), ("admin".to_string(), false)]);

        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
        assert!(realm.is_cached("alice"));
    }

    #[test]
    fn eviction_forces_reload() {
        let store = store(false);
        let realm = AccountStoreRealm::new("accounts", store.clone());
        realm.is_permitted(&alice(), &[p("doc:read")]).expect("check");

        let handler = realm.cache_handler().expect("caching realm");
        handler.clear_cached_authorization_info(&alice());
        assert!(!realm.is_cached("alice"));

        realm.is_permitted(&alice(), &[p("doc:read")]).expect("check");
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
    }

    /// Store whose first lookup hands out the current record, then runs
    /// a callback that changes the record and evicts the identity.
    struct ChangingStore {
        inner: MemoryAccountStore,
        during_lookup: parking_lot::Mutex<Option<Box<dyn FnOnce() + Send>>>,
        lookups: AtomicUsize,
    }

    impl AccountStore for ChangingStore {
        fn get_authz_info(&self, identifier: &str) -> Result<Option<AccountAuthz>, AuthzError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let snapshot = self.inner.get_authz_info(identifier)?;
            if let Some(callback) = self.during_lookup.lock().take() {
                callback();
            }
            Ok(snapshot)
        }
    }

    #[test]
    fn eviction_during_load_is_not_lost() {
        let store = Arc::new(ChangingStore {
            inner: MemoryAccountStore::new()
                .with_account("alice", AccountAuthz::new(["editor"], ["doc:read,write"])),
            during_lookup: parking_lot::Mutex::new(None),
            lookups: AtomicUsize::new(0),
        });
        let realm = Arc::new(AccountStoreRealm::new("accounts", store.clone()));

        let weak = Arc::downgrade(&realm);
        let revoking = Arc::clone(&store);
        *store.during_lookup.lock() = Some(Box::new(move || {
            revoking
                .inner
                .insert("alice", AccountAuthz::new(["viewer"], ["doc:read"]));
            if let Some(realm) = weak.upgrade() {
                realm.clear_cached_authorization_info(&alice());
            }
        }));

        let verdict = realm.is_permitted(&alice(), &[p("doc:write")]).expect("check");
        assert_eq!(verdict, [(p("doc:write"), false)]);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);

        // The cached entry is the post-revocation record.
        let again = realm.is_permitted(&alice(), &[p("doc:write")]).expect("check");
        assert_eq!(again, [(p("doc:write"), false)]);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
        assert!(realm.is_cached("alice"));
    }

    #[test]
    fn unknown_account_denied_and_not_cached() {
        let store = store(false);
        let realm = AccountStoreRealm::new("accounts", store.clone());
        let bob = IdentifierCollection::new("accounts", "bob");

        let results = realm.is_permitted(&bob, &[p("doc:read")]).expect("check");
        assert_eq!(results, [(p("doc:read"), false)]);
        assert_eq!(realm.cached_count(), 0);
    }

    #[test]
    fn anonymous_denied_without_lookup() {
        let store = store(false);
        let realm = AccountStoreRealm::new("accounts", store.clone());
        let results = realm
            .has_role(&IdentifierCollection::default(), &["editor".to_string()])
            .expect("check");
        assert_eq!(results, [("editor".to_string(), false)]);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn store_failure_propagates() {
        let realm = AccountStoreRealm::new("accounts", store(true));
        let err = realm
            .is_permitted(&alice(), &[p("doc:read")])
            .expect_err("store offline");
        assert!(matches!(err, AuthzError::Realm { .. }));
    }

    #[test]
    fn custom_role_verifier() {
        struct AllRoles;
        impl RoleVerifier for AllRoles {
            fn has_role(
                &self,
                _authz_info: &IndexedAuthorizationInfo,
                role_ids: &[String],
            ) -> Vec<(String, bool)> {
                role_ids.iter().map(|r| (r.clone(), true)).collect()
            }
        }

        let realm = AccountStoreRealm::new("accounts", store(false)).with_role_verifier(AllRoles);
        let results = realm.has_role(&alice(), &["root".to_string()]).expect("check");
        assert_eq!(results, [("root".to_string(), true)]);
    }
}
