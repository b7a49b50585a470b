//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "AZB_API_URL";

/// Session file used by the CLI when `auth.storage_path` is unset.
pub const DEFAULT_SESSION_FILE: &str = "azb-session.json";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ClientConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = ?path, base_url = %config.api.base_url, "Configuration loaded");
    Ok(config)
}

/// Defaults plus environment overrides, validated.
pub fn load_default() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides on top of file values.
pub fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.api.base_url = url.trim().to_string();
        }
    }
}

/// Where the CLI keeps the session: next to the config file, or in the
/// working directory when there is none.
pub fn default_session_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .and_then(Path::parent)
        .map(|dir| dir.join(DEFAULT_SESSION_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
}

/// Point session storage at [`default_session_path`] unless configured.
pub fn ensure_session_storage(config: &mut ClientConfig, config_path: Option<&Path>) {
    if config.auth.storage_path.is_none() {
        let path = default_session_path(config_path);
        config.auth.storage_path = Some(path.display().to_string());
    }
}
