//! Event layer errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EventError::UnknownTopic`] | `EVENT_UNKNOWN_TOPIC` | No |
//! | [`EventError::PayloadMismatch`] | `EVENT_PAYLOAD_MISMATCH` | No |

use thiserror::Error;
use warden_types::ErrorCode;

/// Errors raised while building or interpreting events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// Text does not name a known topic.
    #[error("unknown event topic: {0}")]
    UnknownTopic(String),

    /// A listener received a payload shape it cannot handle.
    #[error("topic {topic} delivered an unexpected payload: expected {expected}")]
    PayloadMismatch {
        /// Topic the event was published on.
        topic: String,
        /// Payload kind the listener expected.
        expected: &'static str,
    },
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownTopic(_) => "EVENT_UNKNOWN_TOPIC",
            Self::PayloadMismatch { .. } => "EVENT_PAYLOAD_MISMATCH",
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
    fn codes_follow_convention() {
        assert_error_codes(
            &[
                EventError::UnknownTopic("X".into()),
                EventError::PayloadMismatch {
                    topic: "SESSION.STOP".into(),
                    expected: "session",
                },
            ],
            "EVENT_",
        );
    }

    #[test]
    fn not_recoverable() {
        assert!(!EventError::UnknownTopic("X".into()).is_recoverable());
    }
}
