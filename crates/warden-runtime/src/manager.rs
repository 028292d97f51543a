//! Security manager wiring.
//!
//! [`SecurityManager`] owns the process's single event bus and keeps the
//! authorizer pointed at it. It is also where the lifecycle events of the
//! session and authentication layers enter the system.
//!
//! ```text
//!                ┌──────────────────────────┐
//!  check_* ────► │     SecurityManager      │ ◄──── session_stopped
//!                │                          │ ◄──── session_expired
//!                │  ModularRealmAuthorizer  │ ◄──── authentication_succeeded
//!                └───────┬──────────┬───────┘
//!                        │          │ publish
//!                 realms ▼          ▼
//!                 [Realm, ...]   EventBus ──► cache-clear listeners
//! ```

use crate::config::{ConfigError, WardenConfig};
use crate::realm::{AccountStoreRealm, MemoryAccountStore};
use crate::{LocalEventBus, ModularRealmAuthorizer};
use std::sync::Arc;
use tracing::info;
use warden_auth::{AuthzError, Permission, Realm};
use warden_event::{Event, EventBus, Payload, Topic};
use warden_types::{IdentifierCollection, LogicalOperator, SessionId};

/// Entry point for authorization checks and lifecycle notifications.
///
/// # Example
///
/// ```
/// use warden_auth::Permission;
/// use warden_runtime::config::WardenConfig;
/// use warden_runtime::SecurityManager;
/// use warden_types::IdentifierCollection;
///
/// let config = WardenConfig::from_toml(r#"
/// [[realms]]
/// name = "accounts"
/// [realms.accounts.alice]
/// roles = ["editor"]
/// permissions = ["doc:read,write"]
/// "#)?;
/// let manager = SecurityManager::from_config(&config)?;
///
/// let alice = IdentifierCollection::new("accounts", "alice");
/// let write: Permission = "doc:write".parse()?;
/// let delete: Permission = "doc:delete".parse()?;
/// manager.check_permission(&alice, &[write])?;
/// assert!(manager.check_permission(&alice, &[delete]).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SecurityManager {
    authorizer: ModularRealmAuthorizer,
    event_bus: Arc<dyn EventBus>,
    default_operator: LogicalOperator,
    log_results: bool,
}

impl std::fmt::Debug for SecurityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityManager")
            .field("authorizer", &self.authorizer)
            .field("default_operator", &self.default_operator)
            .field("log_results", &self.log_results)
            .finish_non_exhaustive()
    }
}

impl SecurityManager {
    /// Creates a manager over `realms` with a fresh [`LocalEventBus`].
    #[must_use]
    pub fn new<I>(realms: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Realm>>,
    {
        Self::with_event_bus(Arc::new(LocalEventBus::new()), realms)
    }

    /// Creates a manager over `realms` publishing on `event_bus`.
    #[must_use]
    pub fn with_event_bus<I>(event_bus: Arc<dyn EventBus>, realms: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Realm>>,
    {
        let mut authorizer = ModularRealmAuthorizer::new();
        authorizer.set_event_bus(Arc::clone(&event_bus));
        authorizer.set_realms(realms);
        Self {
            authorizer,
            event_bus,
            default_operator: LogicalOperator::default(),
            log_results: true,
        }
    }

    /// Builds one [`AccountStoreRealm`] per configured realm.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate.
    pub fn from_config(config: &WardenConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let realms: Vec<Arc<dyn Realm>> = config
            .realms
            .iter()
            .map(|realm| {
                let store: MemoryAccountStore = realm
                    .accounts
                    .iter()
                    .map(|(id, authz)| (id.clone(), authz.clone()))
                    .collect();
                Arc::new(AccountStoreRealm::new(&realm.name, Arc::new(store))) as Arc<dyn Realm>
            })
            .collect();

        info!(
            realms = realms.len(),
            operator = %config.authz.default_operator,
            log_results = config.authz.log_results,
            "security manager configured"
        );

        Ok(Self::new(realms)
            .with_default_operator(config.authz.default_operator)
            .with_log_results(config.authz.log_results))
    }

    /// Sets the combinator used by `check_*` and `has_all_roles`.
    #[must_use]
    pub fn with_default_operator(mut self, operator: LogicalOperator) -> Self {
        self.default_operator = operator;
        self
    }

    /// Sets whether non-collective checks publish per-item results.
    #[must_use]
    pub fn with_log_results(mut self, log_results: bool) -> Self {
        self.log_results = log_results;
        self
    }

    /// The authorizer.
    #[must_use]
    pub fn authorizer(&self) -> &ModularRealmAuthorizer {
        &self.authorizer
    }

    /// The event bus the authorizer publishes on and listens to.
    #[must_use]
    pub fn event_bus(&self) -> &Arc<dyn EventBus> {
        &self.event_bus
    }

    /// Combinator used when none is given.
    #[must_use]
    pub fn default_operator(&self) -> LogicalOperator {
        self.default_operator
    }

    /// Replaces the realms.
    pub fn set_realms<I>(&mut self, realms: I)
    where
        I: IntoIterator<Item = Arc<dyn Realm>>,
    {
        self.authorizer.set_realms(realms);
    }

    /// Replaces the event bus and re-applies it to the authorizer.
    pub fn set_event_bus(&mut self, event_bus: Arc<dyn EventBus>) {
        self.authorizer.set_event_bus(Arc::clone(&event_bus));
        self.event_bus = event_bus;
    }

    // === Authorization ===

    /// Per-item permission verdicts.
    ///
    /// # Errors
    ///
    /// See [`ModularRealmAuthorizer::is_permitted`].
    pub fn is_permitted(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
    ) -> Result<Vec<(Permission, bool)>, AuthzError> {
        self.authorizer
            .is_permitted(identifiers, permissions, self.log_results)
    }

    /// `true` if every permission is granted.
    ///
    /// # Errors
    ///
    /// See [`ModularRealmAuthorizer::is_permitted_collective`].
    pub fn is_permitted_all(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
    ) -> Result<bool, AuthzError> {
        self.authorizer
            .is_permitted_collective(identifiers, permissions, LogicalOperator::All)
    }

    /// Checks permissions under the default combinator.
    ///
    /// # Errors
    ///
    /// [`AuthzError::Unauthorized`] on denial.
    pub fn check_permission(
        &self,
        identifiers: &IdentifierCollection,
        permissions: &[Permission],
    ) -> Result<(), AuthzError> {
        self.authorizer
            .check_permission(identifiers, permissions, self.default_operator)
    }

    /// Per-item role verdicts.
    ///
    /// # Errors
    ///
    /// See [`ModularRealmAuthorizer::has_role`].
    pub fn has_role(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
    ) -> Result<Vec<(String, bool)>, AuthzError> {
        self.authorizer
            .has_role(identifiers, role_ids, self.log_results)
    }

    /// `true` if every role is held.
    ///
    /// # Errors
    ///
    /// See [`ModularRealmAuthorizer::has_role_collective`].
    pub fn has_all_roles(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
    ) -> Result<bool, AuthzError> {
        self.authorizer
            .has_role_collective(identifiers, role_ids, LogicalOperator::All)
    }

    /// Checks roles under the default combinator.
    ///
    /// # Errors
    ///
    /// [`AuthzError::Unauthorized`] on denial.
    pub fn check_role(
        &self,
        identifiers: &IdentifierCollection,
        role_ids: &[String],
    ) -> Result<(), AuthzError> {
        self.authorizer
            .check_role(identifiers, role_ids, self.default_operator)
    }

    // === Lifecycle ===

    /// Publishes `SESSION.STOP`. Returns the number of listeners notified.
    pub fn session_stopped(&self, session_id: SessionId, identifier: IdentifierCollection) -> usize {
        self.publish(Topic::SessionStop, Payload::session(session_id, identifier))
    }

    /// Publishes `SESSION.EXPIRE`. Returns the number of listeners notified.
    pub fn session_expired(&self, session_id: SessionId, identifier: IdentifierCollection) -> usize {
        self.publish(Topic::SessionExpire, Payload::session(session_id, identifier))
    }

    /// Publishes `AUTHENTICATION.SUCCEEDED`. Returns the number of
    /// listeners notified.
    pub fn authentication_succeeded(&self, identifier: IdentifierCollection) -> usize {
        self.publish(Topic::AuthenticationSucceeded, Payload::authentication(identifier))
    }

    fn publish(&self, topic: Topic, payload: Payload) -> usize {
        self.event_bus.send_message(Event::new(topic, payload))
    }
}
