//! Event topics.
//!
//! | Topic | Published by | Payload |
//! |-------|--------------|---------|
//! | `AUTHORIZATION.GRANTED` | authorizer | [`Payload::Authorization`] |
//! | `AUTHORIZATION.DENIED` | authorizer | [`Payload::Authorization`] |
//! | `AUTHORIZATION.RESULTS` | authorizer | [`Payload::Authorization`] |
//! | `SESSION.STOP` | session subsystem | [`Payload::Session`] |
//! | `SESSION.EXPIRE` | session subsystem | [`Payload::Session`] |
//! | `AUTHENTICATION.SUCCEEDED` | authenticator | [`Payload::Authentication`] |
//!
//! [`Payload::Authorization`]: crate::Payload::Authorization
//! [`Payload::Session`]: crate::Payload::Session
//! [`Payload::Authentication`]: crate::Payload::Authentication

use crate::EventError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A publish/subscribe topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Aggregate verdict of a collective check was `true`.
    #[serde(rename = "AUTHORIZATION.GRANTED")]
    AuthorizationGranted,
    /// Aggregate verdict of a collective check was `false`.
    #[serde(rename = "AUTHORIZATION.DENIED")]
    AuthorizationDenied,
    /// Per-item verdict of a non-collective check.
    #[serde(rename = "AUTHORIZATION.RESULTS")]
    AuthorizationResults,
    /// A session was stopped (logout).
    #[serde(rename = "SESSION.STOP")]
    SessionStop,
    /// A session expired.
    #[serde(rename = "SESSION.EXPIRE")]
    SessionExpire,
    /// An identity (re-)authenticated successfully.
    #[serde(rename = "AUTHENTICATION.SUCCEEDED")]
    AuthenticationSucceeded,
}

impl Topic {
    /// Every known topic.
    pub const ALL: [Topic; 6] = [
        Topic::AuthorizationGranted,
        Topic::AuthorizationDenied,
        Topic::AuthorizationResults,
        Topic::SessionStop,
        Topic::SessionExpire,
        Topic::AuthenticationSucceeded,
    ];

    /// Returns the dotted wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationGranted => "AUTHORIZATION.GRANTED",
            Self::AuthorizationDenied => "AUTHORIZATION.DENIED",
            Self::AuthorizationResults => "AUTHORIZATION.RESULTS",
            Self::SessionStop => "SESSION.STOP",
            Self::SessionExpire => "SESSION.EXPIRE",
            Self::AuthenticationSucceeded => "AUTHENTICATION.SUCCEEDED",
        }
    }

    /// Returns `true` for the topics that invalidate cached authorization info.
    #[must_use]
    pub fn clears_cache(self) -> bool {
        matches!(
            self,
            Self::SessionStop | Self::SessionExpire | Self::AuthenticationSucceeded
        )
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EventError::UnknownTopic(s.to_string()))
    }
}
