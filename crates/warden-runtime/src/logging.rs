//! Tracing subscriber setup.
//!
//! Filter precedence: `RUST_LOG` if set, else [`LoggingConfig::level`].

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use warden_types::ErrorCode;

/// Logging setup failure.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter '{directive}': {source}")]
    InvalidDirective {
        directive: String,
        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

impl ErrorCode for LoggingError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidDirective { .. } => "LOGGING_INVALID_DIRECTIVE",
            Self::AlreadyInitialized(_) => "LOGGING_ALREADY_INITIALIZED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Builds the filter for `config`.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidDirective`] if `RUST_LOG` is unset and
/// `config.level` does not parse.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|source| LoggingError::InvalidDirective {
        directive: config.level.clone(),
        source,
    })
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] if the filter is invalid or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = filter(config)?;
    let layer = fmt::layer().with_target(false).with_ansi(config.ansi);

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_level_builds_filter() {
        let config = LoggingConfig {
            level: "warden_runtime=debug,warn".into(),
            ansi: false,
        };
        assert!(filter(&config).is_ok());
    }

    #[test]
    fn second_init_fails() {
        let config = LoggingConfig {
            level: "warn".into(),
            ansi: false,
        };
        // Only test in this binary that installs a subscriber
        assert!(init(&config).is_ok());
        let err = init(&config).expect_err("already initialized");
        assert_eq!(err.code(), "LOGGING_ALREADY_INITIALIZED");
    }
}
