//! Realm capabilities.
//!
//! A realm is a source of authorization info for identities. The
//! authorizer consumes realms only through [`Realm`]; realms that cache
//! per-identity info additionally expose an [`AuthorizationCacheHandler`]
//! so lifecycle events can evict stale entries.
//!
//! # Example
//!
//! ```
//! use warden_auth::{
//!     AuthzError, IndexedAuthorizationInfo, IndexedPermissionVerifier, Permission,
//!     PermissionVerifier, Realm,
//! };
//! use warden_types::IdentifierCollection;
//!
//! struct Fixed(IndexedAuthorizationInfo);
//!
//! impl Realm for Fixed {
//!     fn name(&self) -> &str {
//!         "fixed"
//!     }
//!
//!     fn is_permitted(
//!         &self,
//!         _identifiers: &IdentifierCollection,
//!         permissions: &[Permission],
//!     ) -> Result<Vec<(Permission, bool)>, AuthzError> {
//!         IndexedPermissionVerifier.is_permitted(&self.0, permissions)
//!     }
//!
//!     fn has_role(
//!         &self,
//!         _identifiers: &IdentifierCollection,
//!         role_ids: &[String],
//!     ) -> Result<Vec<(String, bool)>, AuthzError> {
//!         Ok(role_ids.iter().map(|r| (r.clone(), self.0.has_role(r))).collect())
//!     }
//! }
//!
//! let realm = Fixed(IndexedAuthorizationInfo::from_parts(["admin"], ["doc:*"]));
//! let who = IdentifierCollection::new("fixed", "alice");
//! let read: Permission = "doc:read".parse()?;
//! assert_eq!(realm.is_permitted(&who, &[read.clone()])?, [(read, true)]);
//! assert!(realm.cache_handler().is_none());
//! # Ok::<(), AuthzError>(())
//! ```

use crate::{AuthzError, Permission};
use warden_types::IdentifierCollection;

/// A source of authorization decisions.
pub trait Realm: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns one verdict per requested permission, in request order.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Realm`] if the authority cannot be reached,
    /// or [`AuthzError::InvalidFormat`] for unparseable stored grants.
    fn is_permitted(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, bool)>, AuthzError>;

    /// Returns one verdict per requested role, in request order.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Realm`] if the authority cannot be reached.
    fn has_role(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
    ) -> Result<Vec<(String, bool)>, AuthzError>;

    /// The realm's cache eviction capability, if it caches.
    fn cache_handler(&self) -> Option<&dyn AuthorizationCacheHandler> {
        None
    }
}

/// Evicts cached authorization info.
pub trait AuthorizationCacheHandler: Send + Sync {
    /// Drops whatever is cached for `identifiers`. A miss is a no-op.
    fn clear_cached_authorization_info(&self, identifiers: &IdentifierCollection);
}
