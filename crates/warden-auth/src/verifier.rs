//! Permission and role verifiers.
//!
//! A verifier answers, for one identity's [`IndexedAuthorizationInfo`],
//! whether each requested item is granted. Verifiers are stateless and
//! return one `(item, verdict)` pair per requested item, in request
//! order, duplicates included.

use crate::permission::WILDCARD_TOKEN;
use crate::{AuthzError, IndexedAuthorizationInfo, Permission, PermissionEntry};
use std::collections::BTreeSet;
use tracing::trace;

/// Decides permissions against authorization info.
pub trait PermissionVerifier: Send + Sync {
    /// Returns one verdict per requested permission.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidFormat`] if a stored raw grant that
    /// must be consulted does not parse.
    fn is_permitted(
        &self,
        authz_info: &IndexedAuthorizationInfo,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, bool)>, AuthzError>;
}

/// Decides roles against authorization info.
pub trait RoleVerifier: Send + Sync {
    /// Returns one verdict per requested role identifier.
    fn has_role(
        &self,
        authz_info: &IndexedAuthorizationInfo,
        role_ids: &[String],
    ) -> Vec<(String, bool)>;
}

/// Permission verifier that consults only the relevant domain buckets.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedPermissionVerifier;

impl IndexedPermissionVerifier {
    /// Creates the verifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Grants that could imply `requested`.
    ///
    /// Collects the buckets of every domain token of `requested` plus the
    /// `*` bucket, de-duplicated, with raw entries parsed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidFormat`] for an unparseable raw entry.
    pub fn get_authzd_permissions(
        &self,
        authz_info: &IndexedAuthorizationInfo,
        requested: &Permission,
    ) -> Result<Vec<Permission>, AuthzError> {
        let mut seen: BTreeSet<&PermissionEntry> = BTreeSet::new();
        let mut granted = Vec::new();

        let domains = requested
            .domain()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(WILDCARD_TOKEN));
        for domain in domains {
            for entry in authz_info.get_permissions(domain) {
                if seen.insert(entry) {
                    granted.push(entry.resolve()?.into_owned());
                }
            }
        }

        Ok(granted)
    }
}

impl PermissionVerifier for IndexedPermissionVerifier {
    fn is_permitted(
        &self,
        authz_info: &IndexedAuthorizationInfo,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, bool)>, AuthzError> {
        let mut results = Vec::with_capacity(permissions.len());
        for requested in permissions {
            let candidates = self.get_authzd_permissions(authz_info, requested)?;
            let granted = candidates.iter().any(|held| held.implies(requested));
            trace!(
                permission = %requested,
                candidates = candidates.len(),
                granted,
                "permission verified"
            );
            results.push((requested.clone(), granted));
        }
        Ok(results)
    }
}

/// Role verifier that checks exact membership.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRoleVerifier;

impl SimpleRoleVerifier {
    /// Creates the verifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RoleVerifier for SimpleRoleVerifier {
    fn has_role(
        &self,
        authz_info: &IndexedAuthorizationInfo,
        role_ids: &[String],
    ) -> Vec<(String, bool)> {
        role_ids
            .iter()
            .map(|role| (role.clone(), authz_info.has_role(role)))
            .collect()
    }
}
