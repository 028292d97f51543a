//! Domain-indexed authorization info.
//!
//! [`IndexedAuthorizationInfo`] holds one identity's roles and
//! permissions. Permissions are bucketed by domain token so a check only
//! compares against grants that could possibly apply: the requested
//! domain's bucket and the `*` bucket.
//!
//! ```text
//! add_permission(["doc:read", "doc,report:write", "*:audit"])
//!
//!   "doc"    → { doc:read, doc,report:write }
//!   "report" → { doc,report:write }
//!   "*"      → { *:audit }
//! ```

use crate::permission::{PART_DIVIDER, SUBPART_DIVIDER};
use crate::{AuthzError, Permission};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

static NO_PERMISSIONS: BTreeSet<PermissionEntry> = BTreeSet::new();

/// A stored grant: either already parsed, or raw text parsed on demand.
///
/// Realms that load grants from an external store can index the text as
/// is and only pay for parsing when a check touches that domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PermissionEntry {
    /// A parsed permission.
    Parsed(Permission),
    /// Unparsed permission text.
    Raw(String),
}

impl PermissionEntry {
    /// Lowercased domain tokens this entry is indexed under.
    ///
    /// Empty for raw text with no domain.
    #[must_use]
    pub fn domain_tokens(&self) -> Vec<String> {
        match self {
            Self::Parsed(permission) => permission.domain().iter().cloned().collect(),
            Self::Raw(text) => text
                .split(PART_DIVIDER)
                .next()
                .unwrap_or_default()
                .split(SUBPART_DIVIDER)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase)
                .collect(),
        }
    }

    /// Returns the entry as a [`Permission`], parsing raw text.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidFormat`] if raw text does not parse.
    pub fn resolve(&self) -> Result<Cow<'_, Permission>, AuthzError> {
        match self {
            Self::Parsed(permission) => Ok(Cow::Borrowed(permission)),
            Self::Raw(text) => Permission::parse(text).map(Cow::Owned),
        }
    }
}

impl std::fmt::Display for PermissionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parsed(permission) => permission.fmt(f),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

impl From<Permission> for PermissionEntry {
    fn from(value: Permission) -> Self {
        Self::Parsed(value)
    }
}

impl From<String> for PermissionEntry {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<&str> for PermissionEntry {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_string())
    }
}

/// Roles and domain-indexed permissions of one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedAuthorizationInfo {
    roles: BTreeSet<String>,
    index: HashMap<String, BTreeSet<PermissionEntry>>,
}

impl IndexedAuthorizationInfo {
    /// Creates empty authorization info.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds authorization info from roles and grants.
    #[must_use]
    pub fn from_parts<R, S, P, E>(roles: R, permissions: P) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator<Item = E>,
        E: Into<PermissionEntry>,
    {
        let mut info = Self::new();
        info.add_role(roles);
        info.add_permission(permissions);
        info
    }

    /// Role identifiers held.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Returns `true` if `role_id` is held.
    #[must_use]
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.contains(role_id)
    }

    /// Adds role identifiers.
    pub fn add_role<I, S>(&mut self, role_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(role_ids.into_iter().map(Into::into));
    }

    /// Adds grants to the index.
    pub fn add_permission<I, E>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<PermissionEntry>,
    {
        self.index_permission(permissions);
    }

    /// Files each grant under every one of its domain tokens.
    ///
    /// Raw text with no domain is logged and skipped.
    pub fn index_permission<I, E>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<PermissionEntry>,
    {
        for entry in permissions.into_iter().map(Into::into) {
            let domains = entry.domain_tokens();
            if domains.is_empty() {
                warn!(permission = %entry, "permission has no domain, not indexed");
                continue;
            }
            for domain in domains {
                self.index.entry(domain).or_default().insert(entry.clone());
            }
        }
    }

    /// Grants filed under `domain`, or an empty set.
    #[must_use]
    pub fn get_permissions(&self, domain: &str) -> &BTreeSet<PermissionEntry> {
        self.index.get(domain).unwrap_or(&NO_PERMISSIONS)
    }

    /// Every distinct grant across all domains.
    #[must_use]
    pub fn permissions(&self) -> BTreeSet<PermissionEntry> {
        self.index.values().flatten().cloned().collect()
    }

    /// Replaces all grants.
    pub fn set_permissions<I, E>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<PermissionEntry>,
    {
        self.index.clear();
        self.index_permission(permissions);
    }

    /// Domain tokens that have at least one grant.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Returns `true` if there are no roles and no grants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> PermissionEntry {
        PermissionEntry::Parsed(Permission::parse(text).expect("valid permission"))
    }

    #[test]
    fn index_by_domain() {
        let mut info = IndexedAuthorizationInfo::new();
        info.index_permission([
            parsed("domain1:action1:target1"),
            parsed("domain2:*:*"),
            parsed("domain1:action2:*"),
        ]);

        let indexed: usize = info.index.values().map(BTreeSet::len).sum();
        assert_eq!(indexed, 3);

        let domain1 = info.get_permissions("domain1");
        assert_eq!(domain1.len(), 2);
        assert!(domain1.contains(&parsed("domain1:action1:target1")));
        assert!(domain1.contains(&parsed("domain1:action2:*")));

        assert!(info.get_permissions("domainX").is_empty());
    }

    #[test]
    fn multi_domain_grant_lands_in_each_bucket() {
        let info = IndexedAuthorizationInfo::from_parts(Vec::<String>::new(), ["doc,report:read"]);
        assert_eq!(info.get_permissions("doc").len(), 1);
        assert_eq!(info.get_permissions("report").len(), 1);
        assert_eq!(info.permissions().len(), 1);
    }

    #[test]
    fn raw_entries_index_lowercased() {
        let mut info = IndexedAuthorizationInfo::new();
        info.add_permission(["Doc:Read", " *:audit"]);
        assert_eq!(info.get_permissions("doc").len(), 1);
        assert_eq!(info.get_permissions("*").len(), 1);
        let mut domains: Vec<_> = info.domains().collect();
        domains.sort_unstable();
        assert_eq!(domains, ["*", "doc"]);
    }

    #[test]
    fn domainless_raw_entry_skipped() {
        let mut info = IndexedAuthorizationInfo::new();
        info.add_permission([":read", "", "doc:read"]);
        assert_eq!(info.permissions().len(), 1);
    }

    #[test]
    fn set_permissions_replaces() {
        let mut info = IndexedAuthorizationInfo::from_parts(["admin"], ["doc:read"]);
        info.set_permissions(["report:write"]);
        assert!(info.get_permissions("doc").is_empty());
        assert_eq!(info.get_permissions("report").len(), 1);
        assert!(info.has_role("admin"));
    }

    #[test]
    fn resolve_parses_raw_text() {
        let raw = PermissionEntry::from("DOC:read");
        let resolved = raw.resolve().expect("resolve");
        assert_eq!(resolved.to_string(), "doc:read");

        let broken = PermissionEntry::from("doc:a:b:c");
        assert!(broken.resolve().is_err());
    }

    #[test]
    fn roles() {
        let mut info = IndexedAuthorizationInfo::new();
        assert!(info.is_empty());
        info.add_role(["admin", "auditor", "admin"]);
        assert_eq!(info.roles().len(), 2);
        assert!(info.has_role("auditor"));
        assert!(!info.has_role("guest"));
        assert!(!info.is_empty());
    }
}
