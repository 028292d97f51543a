//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌───────────────────────────────────────────┐
//! │  1. Environment Variables (WARDEN_*)      │  Runtime override
//! ├───────────────────────────────────────────┤
//! │  2. Explicit Config File                  │  Deployment-specific
//! ├───────────────────────────────────────────┤
//! │  3. Global Config (~/.warden/config.toml) │  User defaults
//! ├───────────────────────────────────────────┤
//! │  4. Default Values (compile-time)         │  Fallback
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `WARDEN_DEFAULT_OPERATOR` | `authz.default_operator` | `all` / `any` |
//! | `WARDEN_LOG_RESULTS` | `authz.log_results` | bool |
//! | `WARDEN_LOG_LEVEL` | `logging.level` | String |
//!
//! # Example Configuration
//!
//! ```toml
//! [authz]
//! default_operator = "all"
//! log_results = true
//!
//! [logging]
//! level = "warden_runtime=debug,warn"
//! ansi = true
//!
//! [[realms]]
//! name = "accounts"
//!
//! [realms.accounts.alice]
//! roles = ["editor"]
//! permissions = ["doc:read,write", "report:*:7"]
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{AuthzConfig, AuthzLayer, ConfigLayer, LoggingConfig, LoggingLayer, RealmConfig, WardenConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".warden")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}
