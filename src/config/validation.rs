//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! reported, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("api.base_url", e.to_string())),
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ValidationError::new("api.request_timeout_secs", "must be > 0"));
    }
    if config.api.otp_timeout_secs == 0 {
        errors.push(ValidationError::new("api.otp_timeout_secs", "must be > 0"));
    }
    if !config.auth.login_path.starts_with('/') {
        errors.push(ValidationError::new("auth.login_path", "must start with '/'"));
    }
    if let Some(otp) = config.auth.otp_paths.iter().find(|p| !p.starts_with('/')) {
        errors.push(ValidationError::new(
            "auth.otp_paths",
            format!("'{}' must start with '/'", otp),
        ));
    }
    if !config.health_check.path.starts_with('/') {
        errors.push(ValidationError::new("health_check.path", "must start with '/'"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::new("health_check.timeout_secs", "must be > 0"));
    }
    if config.health_check.cache_ttl_secs == 0 {
        errors.push(ValidationError::new("health_check.cache_ttl_secs", "must be > 0"));
    }
    if config.health_check.wake_attempts == 0 {
        errors.push(ValidationError::new("health_check.wake_attempts", "must be >= 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
