//! Machine-readable error classification shared by every warden crate.
//!
//! Each error enum implements [`ErrorCode`], which gives callers a stable
//! code to branch on and tells them whether trying again can help.
//!
//! ```
//! use warden_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum DirectoryError {
//!     Offline,
//!     BadRecord,
//! }
//!
//! impl ErrorCode for DirectoryError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Offline => "DIRECTORY_OFFLINE",
//!             Self::BadRecord => "DIRECTORY_BAD_RECORD",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Offline)
//!     }
//! }
//!
//! assert!(DirectoryError::Offline.is_recoverable());
//! assert!(!DirectoryError::BadRecord.is_recoverable());
//! ```

/// Stable code plus retry hint for an error value.
///
/// Codes are UPPER_SNAKE_CASE and start with the owning crate's domain
/// (`AUTHZ_`, `EVENT_`, `CONFIG_`, `LOGGING_`). They are part of the
/// public contract.
///
/// A denial or a misconfiguration is never recoverable: asking again
/// produces the same answer.
pub trait ErrorCode {
    /// Stable identifier, e.g. `"AUTHZ_UNAUTHORIZED"`.
    fn code(&self) -> &'static str;

    /// `true` if a retry or outside action may change the outcome.
    fn is_recoverable(&self) -> bool;
}

/// Reason `code` breaks the naming rules, if any.
fn code_violation(code: &str, prefix: &str) -> Option<&'static str> {
    let well_formed = !code.is_empty()
        && !code.starts_with('_')
        && !code.ends_with('_')
        && !code.contains("__")
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');

    if !code.starts_with(prefix) {
        Some("wrong prefix")
    } else if !well_formed {
        Some("not UPPER_SNAKE_CASE")
    } else {
        None
    }
}

/// Test helper: panics unless `err.code()` is well formed and starts
/// with `prefix`.
///
/// ```
/// use warden_types::{assert_error_code, ErrorCode};
///
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "NET_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "NET_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, prefix: &str) {
    let code = err.code();
    if let Some(violation) = code_violation(code, prefix) {
        panic!("error code {code:?} (expected prefix {prefix:?}): {violation}");
    }
}

/// [`assert_error_code`] for each of `errors`.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], prefix: &str) {
    errors.iter().for_each(|err| assert_error_code(err, prefix));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Code(&'static str);

    impl ErrorCode for Code {
        fn code(&self) -> &'static str {
            self.0
        }

        fn is_recoverable(&self) -> bool {
            false
        }
    }

    #[test]
    fn well_formed_codes_pass() {
        assert_error_codes(&[Code("AUTHZ_UNAUTHORIZED"), Code("AUTHZ_V2_DENIED")], "AUTHZ_");
    }

    #[test]
    #[should_panic(expected = "wrong prefix")]
    fn foreign_prefix_panics() {
        assert_error_code(&Code("EVENT_UNKNOWN_TOPIC"), "AUTHZ_");
    }

    #[test]
    fn violations() {
        assert_eq!(code_violation("AUTHZ_OK", "AUTHZ_"), None);
        assert_eq!(code_violation("", "AUTHZ_"), Some("wrong prefix"));
        assert_eq!(code_violation("AUTHZ_", "AUTHZ_"), Some("not UPPER_SNAKE_CASE"));
        assert_eq!(code_violation("AUTHZ__X", "AUTHZ_"), Some("not UPPER_SNAKE_CASE"));
        assert_eq!(code_violation("AUTHZ_denied", "AUTHZ_"), Some("not UPPER_SNAKE_CASE"));
        assert_eq!(code_violation("_X", ""), Some("not UPPER_SNAKE_CASE"));
    }
}
