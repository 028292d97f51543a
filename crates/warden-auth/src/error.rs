//! Authorization errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`AuthzError::InvalidFormat`] | `AUTHZ_INVALID_FORMAT` | No |
//! | [`AuthzError::RealmsNotConfigured`] | `AUTHZ_REALMS_NOT_CONFIGURED` | No |
//! | [`AuthzError::Unauthorized`] | `AUTHZ_UNAUTHORIZED` | No |
//! | [`AuthzError::EventBusNotConfigured`] | `AUTHZ_EVENT_BUS_NOT_CONFIGURED` | No |
//! | [`AuthzError::Realm`] | `AUTHZ_REALM_FAILED` | Yes |
//!
//! `Unauthorized` is the normal outcome of a failed `check_*` call, not
//! a system fault. The two `*NotConfigured` variants are wiring bugs and
//! are surfaced rather than defaulted, since a silent default would hide
//! every authorization decision.

use thiserror::Error;
use warden_types::{ErrorCode, IdentifierCollection, LogicalOperator};

/// Kind of item a check was performed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A [`Permission`](crate::Permission).
    Permission,
    /// A role identifier.
    Role,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permission => f.write_str("permission"),
            Self::Role => f.write_str("role"),
        }
    }
}

/// Errors raised by the authorization core.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Permission text could not be parsed.
    #[error("invalid permission '{text}': {reason}")]
    InvalidFormat {
        /// The offending text.
        text: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A check was attempted before any realm was configured.
    #[error("no realms configured: at least one realm is required to authorize")]
    RealmsNotConfigured,

    /// The aggregate verdict of a `check_*` call was `false`.
    #[error(
        "unauthorized: '{identifiers}' is not granted {kind}(s) [{}] under '{logical_operator}'",
        .items.join(", ")
    )]
    Unauthorized {
        /// Identity that was checked.
        identifiers: IdentifierCollection,
        /// Whether permissions or roles were checked.
        kind: ItemKind,
        /// Items requested.
        items: Vec<String>,
        /// Combinator applied across items.
        logical_operator: LogicalOperator,
    },

    /// An event had to be published but no event bus is configured.
    #[error("no event bus configured: authorization events cannot be published")]
    EventBusNotConfigured,

    /// A realm's authority lookup failed.
    #[error("realm '{realm}' failed: {message}")]
    Realm {
        /// Name of the failing realm.
        realm: String,
        /// Failure description from the authority.
        message: String,
    },
}

impl AuthzError {
    /// Creates an [`AuthzError::InvalidFormat`].
    #[must_use]
    pub fn invalid_format(text: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFormat {
            text: text.into(),
            reason,
        }
    }

    /// Creates an [`AuthzError::Realm`].
    #[must_use]
    pub fn realm(realm: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Realm {
            realm: realm.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for [`AuthzError::Unauthorized`].
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl ErrorCode for AuthzError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "AUTHZ_INVALID_FORMAT",
            Self::RealmsNotConfigured => "AUTHZ_REALMS_NOT_CONFIGURED",
            Self::Unauthorized { .. } => "AUTHZ_UNAUTHORIZED",
            Self::EventBusNotConfigured => "AUTHZ_EVENT_BUS_NOT_CONFIGURED",
            Self::Realm { .. } => "AUTHZ_REALM_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // An authority outage may clear up; nothing else changes on retry.
        matches!(self, Self::Realm { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::assert_error_codes;

    fn unauthorized() -> AuthzError {
        AuthzError::Unauthorized {
            identifiers: IdentifierCollection::new("accounts", "bob"),
            kind: ItemKind::Permission,
            items: vec!["doc:read".into(), "doc:write".into()],
            logical_operator: LogicalOperator::All,
        }
    }

    #[test]
    fn codes_follow_convention() {
        assert_error_codes(
            &[
                AuthzError::invalid_format("", "empty"),
                AuthzError::RealmsNotConfigured,
                unauthorized(),
                AuthzError::EventBusNotConfigured,
                AuthzError::realm("ldap", "timeout"),
            ],
            "AUTHZ_",
        );
    }

    #[test]
    fn unauthorized_display() {
        let msg = unauthorized().to_string();
        assert!(msg.contains("bob"), "got: {msg}");
        assert!(msg.contains("doc:read, doc:write"), "got: {msg}");
        assert!(msg.contains("'all'"), "got: {msg}");
        assert!(unauthorized().is_unauthorized());
    }

    #[test]
    fn only_realm_failures_recoverable() {
        assert!(AuthzError::realm("ldap", "timeout").is_recoverable());
        assert!(!AuthzError::RealmsNotConfigured.is_recoverable());
        assert!(!unauthorized().is_recoverable());
    }

    #[test]
    fn item_kind_display() {
        assert_eq!(ItemKind::Permission.to_string(), "permission");
        assert_eq!(ItemKind::Role.to_string(), "role");
    }
}
