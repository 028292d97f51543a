//! Account authority stores.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use warden_auth::{AuthzError, IndexedAuthorizationInfo, PermissionEntry};

/// Roles and permission text recorded for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountAuthz {
    /// Role identifiers.
    pub roles: BTreeSet<String>,
    /// Permission text, `domain[:action[:target]]`.
    pub permissions: Vec<String>,
}

impl AccountAuthz {
    /// Creates an account record.
    #[must_use]
    pub fn new<R, P>(roles: R, permissions: P) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds indexed authorization info. Permission text stays raw
    /// until a check needs it.
    #[must_use]
    pub fn to_authz_info(&self) -> IndexedAuthorizationInfo {
        IndexedAuthorizationInfo::from_parts(
            self.roles.iter().cloned(),
            self.permissions.iter().cloned().map(PermissionEntry::Raw),
        )
    }
}

/// Authority lookup by account identifier.
pub trait AccountStore: Send + Sync {
    /// Returns the account's roles and permissions, or `None` if the
    /// account is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Realm`] if the authority cannot be read.
    fn get_authz_info(&self, identifier: &str) -> Result<Option<AccountAuthz>, AuthzError>;
}

/// In-memory [`AccountStore`].
///
/// # Example
///
/// ```
/// use warden_runtime::{AccountAuthz, AccountStore, MemoryAccountStore};
///
/// let store = MemoryAccountStore::new()
///     .with_account("alice", AccountAuthz::new(["admin"], ["doc:*"]));
///
/// assert!(store.get_authz_info("alice")?.is_some());
/// assert!(store.get_authz_info("bob")?.is_none());
/// # Ok::<(), warden_auth::AuthzError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, AccountAuthz>>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account, builder style.
    #[must_use]
    pub fn with_account(self, identifier: impl Into<String>, authz: AccountAuthz) -> Self {
        self.insert(identifier, authz);
        self
    }

    /// Inserts or replaces an account, returning the previous record.
    ///
    /// Realms that already cached the account keep their copy until
    /// their cache is cleared for it.
    pub fn insert(&self, identifier: impl Into<String>, authz: AccountAuthz) -> Option<AccountAuthz> {
        self.accounts.write().insert(identifier.into(), authz)
    }

    /// Removes an account.
    pub fn remove(&self, identifier: &str) -> Option<AccountAuthz> {
        self.accounts.write().remove(identifier)
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Returns `true` if there are no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, AccountAuthz)> for MemoryAccountStore {
    fn from_iter<I: IntoIterator<Item = (S, AccountAuthz)>>(iter: I) -> Self {
        let accounts = iter.into_iter().map(|(id, a)| (id.into(), a)).collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }
}

impl AccountStore for MemoryAccountStore {
    fn get_authz_info(&self, identifier: &str) -> Result<Option<AccountAuthz>, AuthzError> {
        Ok(self.accounts.read().get(identifier).cloned())
    }
}
