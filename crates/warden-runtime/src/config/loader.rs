//! Layered configuration loading.
//!
//! Layers, lowest priority first:
//!
//! 1. [`WardenConfig::default`]
//! 2. Global file (`~/.warden/config.toml`), unless skipped or replaced
//! 3. Files added with [`ConfigLoader::with_config_file`], in call order
//! 4. `WARDEN_*` environment variables
//!
//! Missing files are skipped. The merged result is validated before it
//! is returned.

use super::{default_config_path, ConfigError, ConfigLayer, WardenConfig};
use std::path::{Path, PathBuf};
use tracing::debug;
use warden_types::LogicalOperator;

/// Where the global layer comes from.
#[derive(Debug, Clone, Default)]
enum GlobalLayer {
    #[default]
    Home,
    At(PathBuf),
    Skipped,
}

/// Builder that reads and merges configuration layers.
///
/// ```no_run
/// use warden_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_config_file("/etc/warden/config.toml")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), warden_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global: GlobalLayer,
    files: Vec<PathBuf>,
    skip_env: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the global layer from `path` instead of the home directory.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global = GlobalLayer::At(path.into());
        self
    }

    /// Adds a file layer above the global one. Later files win.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Ignores `WARDEN_*` variables.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Ignores the global layer.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.global = GlobalLayer::Skipped;
        self
    }

    /// Builds the merged, validated config.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Io`] / [`ConfigError::Parse`] for a file that
    ///   exists but is unreadable
    /// - [`ConfigError::EnvVar`] for a malformed override
    /// - any error from [`WardenConfig::validate`]
    pub fn load(&self) -> Result<WardenConfig, ConfigError> {
        let mut config = WardenConfig::default();

        for path in self.layer_paths() {
            if let Some(layer) = read_layer(&path)? {
                debug!(path = %path.display(), realms = layer.realms.len(), "config layer merged");
                config.merge(&layer);
            }
        }

        if !self.skip_env {
            apply_env(&mut config, |var| std::env::var(var).ok())?;
        }

        config.validate()?;
        Ok(config)
    }

    fn layer_paths(&self) -> Vec<PathBuf> {
        let global = match &self.global {
            GlobalLayer::Home => Some(default_config_path()),
            GlobalLayer::At(path) => Some(path.clone()),
            GlobalLayer::Skipped => None,
        };
        global.into_iter().chain(self.files.iter().cloned()).collect()
    }
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ConfigLayer::from_toml(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Applies `WARDEN_*` overrides using `lookup` to read variables.
fn apply_env<F>(config: &mut WardenConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let rejected = |var: &'static str, value: &str, reason: String| ConfigError::EnvVar {
        var,
        value: value.to_string(),
        reason,
    };

    if let Some(value) = lookup("WARDEN_DEFAULT_OPERATOR") {
        config.authz.default_operator = value
            .parse::<LogicalOperator>()
            .map_err(|e| rejected("WARDEN_DEFAULT_OPERATOR", &value, e.to_string()))?;
    }
    if let Some(value) = lookup("WARDEN_LOG_RESULTS") {
        config.authz.log_results = parse_bool(&value)
            .ok_or_else(|| rejected("WARDEN_LOG_RESULTS", &value, "not a boolean".into()))?;
    }
    if let Some(value) = lookup("WARDEN_LOG_LEVEL") {
        config.logging.level = value;
    }
    Ok(())
}

/// `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`, any case.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
