//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;
use warden_auth::AuthzError;
use warden_types::ErrorCode;

/// Failure while loading or validating a [`WardenConfig`](super::WardenConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config layer exists but could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config layer is not valid TOML for the config schema.
    #[error("cannot parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A `WARDEN_*` override holds an unusable value.
    #[error("{var}={value:?} rejected: {reason}")]
    EnvVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// A realm entry is unusable.
    #[error("invalid realm '{name}': {message}")]
    InvalidRealm { name: String, message: String },

    /// An account lists a permission that does not parse.
    #[error("realm '{realm}', account '{account}': {source}")]
    InvalidPermission {
        realm: String,
        account: String,
        #[source]
        source: AuthzError,
    },
}

impl ConfigError {
    pub(crate) fn invalid_realm(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRealm {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CONFIG_IO",
            Self::Parse { .. } => "CONFIG_PARSE",
            Self::EnvVar { .. } => "CONFIG_ENV_VAR",
            Self::InvalidRealm { .. } => "CONFIG_INVALID_REALM",
            Self::InvalidPermission { .. } => "CONFIG_INVALID_PERMISSION",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::assert_error_codes;

    #[test]
    fn env_var_message_shows_value() {
        let err = ConfigError::EnvVar {
            var: "WARDEN_LOG_RESULTS",
            value: "maybe".into(),
            reason: "not a boolean".into(),
        };
        assert_eq!(
            err.to_string(),
            "WARDEN_LOG_RESULTS=\"maybe\" rejected: not a boolean"
        );
    }

    #[test]
    fn invalid_permission_names_location() {
        let err = ConfigError::InvalidPermission {
            realm: "accounts".into(),
            account: "alice".into(),
            source: AuthzError::invalid_format("a:b:c:d", "too many parts"),
        };
        let msg = err.to_string();
        assert!(msg.contains("accounts") && msg.contains("alice"), "got: {msg}");
        assert!(msg.contains("a:b:c:d"), "got: {msg}");
    }

    #[test]
    fn codes_follow_convention() {
        assert_error_codes(
            &[
                ConfigError::invalid_realm("r", "empty"),
                ConfigError::Io {
                    path: "/x".into(),
                    source: std::io::Error::other("boom"),
                },
            ],
            "CONFIG_",
        );
    }
}
