//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use crate::realm::AccountAuthz;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use warden_auth::Permission;
use warden_types::LogicalOperator;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use warden_runtime::config::WardenConfig;
/// use warden_types::LogicalOperator;
///
/// let config = WardenConfig::default();
/// assert_eq!(config.authz.default_operator, LogicalOperator::All);
/// assert!(config.realms.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WardenConfig {
    /// Authorizer settings.
    pub authz: AuthzConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Realms, in consultation order.
    pub realms: Vec<RealmConfig>,
}

impl WardenConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Applies a layer on top of this config.
    ///
    /// Every key present in `layer` overrides, including one that
    /// restates the default. Realms are merged by name: a realm in
    /// `layer` replaces the same-named realm in `self`, new names are
    /// appended.
    pub fn merge(&mut self, layer: &ConfigLayer) {
        let authz = &layer.authz;
        if let Some(operator) = authz.default_operator {
            self.authz.default_operator = operator;
        }
        if let Some(log_results) = authz.log_results {
            self.authz.log_results = log_results;
        }

        let logging = &layer.logging;
        if let Some(level) = &logging.level {
            self.logging.level.clone_from(level);
        }
        if let Some(ansi) = logging.ansi {
            self.logging.ansi = ansi;
        }

        for realm in &layer.realms {
            match self.realms.iter_mut().find(|r| r.name == realm.name) {
                Some(existing) => *existing = realm.clone(),
                None => self.realms.push(realm.clone()),
            }
        }
    }

    /// Checks realm names and parses every configured permission.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidRealm`] for an empty or duplicated name
    /// - [`ConfigError::InvalidPermission`] for unparseable permission text
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for realm in &self.realms {
            if realm.name.trim().is_empty() {
                return Err(ConfigError::invalid_realm(&realm.name, "name is empty"));
            }
            if !names.insert(realm.name.as_str()) {
                return Err(ConfigError::invalid_realm(&realm.name, "name is duplicated"));
            }
            for (account, authz) in &realm.accounts {
                for text in &authz.permissions {
                    Permission::parse(text).map_err(|source| ConfigError::InvalidPermission {
                        realm: realm.name.clone(),
                        account: account.clone(),
                        source,
                    })?;
                }
            }
        }
        Ok(())
    }
}

/// Authorizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthzConfig {
    /// Combinator for collective checks that do not name one.
    pub default_operator: LogicalOperator,

    /// Publish one `AUTHORIZATION.RESULTS` event per item on
    /// non-collective checks.
    pub log_results: bool,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            default_operator: LogicalOperator::All,
            log_results: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,

    /// Colored terminal output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            ansi: true,
        }
    }
}


/// One account-store realm.
///
/// ```toml
/// [[realms]]
/// name = "accounts"
///
/// [realms.accounts.alice]
/// roles = ["editor"]
/// permissions = ["doc:read,write", "report:*:7"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RealmConfig {
    /// Realm name.
    pub name: String,

    /// Accounts keyed by identifier.
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountAuthz>,
}

/// One config file as written: keys absent from the file stay `None`.
///
/// ```
/// use warden_runtime::config::{ConfigLayer, WardenConfig};
/// use warden_types::LogicalOperator;
///
/// let mut config = WardenConfig::default();
/// config.merge(&ConfigLayer::from_toml("[authz]\ndefault_operator = \"any\"")?);
/// config.merge(&ConfigLayer::from_toml("[authz]\ndefault_operator = \"all\"")?);
/// assert_eq!(config.authz.default_operator, LogicalOperator::All);
/// # Ok::<(), toml::de::Error>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigLayer {
    pub authz: AuthzLayer,
    pub logging: LoggingLayer,
    pub realms: Vec<RealmConfig>,
}

impl ConfigLayer {
    /// Parses one layer.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid TOML for the schema.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// `[authz]` keys present in a layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthzLayer {
    pub default_operator: Option<LogicalOperator>,
    pub log_results: Option<bool>,
}

/// `[logging]` keys present in a layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingLayer {
    pub level: Option<String>,
    pub ansi: Option<bool>,
}

impl From<WardenConfig> for ConfigLayer {
    /// A layer that sets every key.
    fn from(config: WardenConfig) -> Self {
        Self {
            authz: AuthzLayer {
                default_operator: Some(config.authz.default_operator),
                log_results: Some(config.authz.log_results),
            },
            logging: LoggingLayer {
                level: Some(config.logging.level),
                ansi: Some(config.logging.ansi),
            },
            realms: config.realms,
        }
    }
}
