//! UUID-based identifiers for transient runtime objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a single published event.
///
/// Events are never persisted; the id only correlates log lines emitted
/// by different subscribers for the same publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Creates a new random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evt:{}", self.0)
    }
}

/// Identifier of a session owned by the (external) session subsystem.
///
/// Carried in `SESSION.STOP` / `SESSION.EXPIRE` payloads. There is no
/// `Default`: a session id always originates from a concrete session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Creates a new random id.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_display_and_uniqueness() {
        let a = EventId::new();
        let b = EventId::default();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("evt:"));
        assert!(a.to_string().contains(&a.uuid().to_string()));
    }

    #[test]
    fn session_id_display() {
        let id = SessionId::new();
        assert!(format!("{id}").starts_with("session:"));
        assert_eq!(id.uuid(), id.0);
    }
}
