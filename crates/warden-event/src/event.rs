//! Event and payload types.
//!
//! An [`Event`] exists only for the duration of a publish call. It is
//! never persisted; it derives serde so subscribers may forward it to
//! an audit sink.

use crate::Topic;
use serde::{Deserialize, Serialize};
use warden_types::{EventId, IdentifierCollection, LogicalOperator, SessionId};

/// One requested item as reported in an authorization event.
///
/// `granted` is `None` for collective events (the verdict is the topic
/// itself) and `Some` for per-item `AUTHORIZATION.RESULTS` events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthzItem {
    /// Canonical text of the permission or the role identifier.
    pub item: String,
    /// Per-item verdict, when one is reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted: Option<bool>,
}

impl AuthzItem {
    /// An item without a per-item verdict.
    #[must_use]
    pub fn requested(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            granted: None,
        }
    }

    /// An item with its verdict.
    #[must_use]
    pub fn with_verdict(item: impl Into<String>, granted: bool) -> Self {
        Self {
            item: item.into(),
            granted: Some(granted),
        }
    }
}

/// Payload of the `AUTHORIZATION.*` topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPayload {
    /// Identity the check was performed for.
    pub identifiers: IdentifierCollection,
    /// Items that were checked.
    pub items: Vec<AuthzItem>,
    /// Combinator used, for collective checks.
    pub logical_operator: Option<LogicalOperator>,
}

/// Payload of the `SESSION.*` topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Session that ended.
    pub session_id: SessionId,
    /// Identity bound to the session.
    pub identifier: IdentifierCollection,
}

/// Topic-specific event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Authorization verdict report.
    Authorization(AuthorizationPayload),
    /// Session lifecycle notification.
    Session(SessionPayload),
    /// Successful authentication of `identifier`.
    Authentication {
        /// Identity that authenticated.
        identifier: IdentifierCollection,
    },
}

impl Payload {
    /// Builds an authorization payload.
    #[must_use]
    pub fn authorization(
        identifiers: IdentifierCollection,
        items: Vec<AuthzItem>,
        logical_operator: Option<LogicalOperator>,
    ) -> Self {
        Self::Authorization(AuthorizationPayload {
            identifiers,
            items,
            logical_operator,
        })
    }

    /// Builds a session payload.
    #[must_use]
    pub fn session(session_id: SessionId, identifier: IdentifierCollection) -> Self {
        Self::Session(SessionPayload {
            session_id,
            identifier,
        })
    }

    /// Builds an authentication payload.
    #[must_use]
    pub fn authentication(identifier: IdentifierCollection) -> Self {
        Self::Authentication { identifier }
    }

    /// Returns the identity whose cached state a lifecycle event concerns.
    ///
    /// `None` for authorization payloads.
    #[must_use]
    pub fn identifier(&self) -> Option<&IdentifierCollection> {
        match self {
            Self::Session(s) => Some(&s.identifier),
            Self::Authentication { identifier } => Some(identifier),
            Self::Authorization(_) => None,
        }
    }

    /// Returns the authorization payload, if this is one.
    #[must_use]
    pub fn as_authorization(&self) -> Option<&AuthorizationPayload> {
        match self {
            Self::Authorization(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the session payload, if this is one.
    #[must_use]
    pub fn as_session(&self) -> Option<&SessionPayload> {
        match self {
            Self::Session(p) => Some(p),
            _ => None,
        }
    }

    /// Short name of the payload kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "authorization",
            Self::Session(_) => "session",
            Self::Authentication { .. } => "authentication",
        }
    }
}

/// A message published on a [`Topic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Correlation id.
    pub id: EventId,
    /// Topic the event is published on.
    pub topic: Topic,
    /// Topic-specific body.
    pub payload: Payload,
}

impl Event {
    /// Creates an event with a fresh id.
    #[must_use]
    pub fn new(topic: Topic, payload: Payload) -> Self {
        Self {
            id: EventId::new(),
            topic,
            payload,
        }
    }
}
