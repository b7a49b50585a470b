//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the API client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend API location and request deadlines.
    pub api: ApiConfig,

    /// Session and token persistence settings.
    pub auth: AuthConfig,

    /// Liveness probe and wake-up settings.
    pub health_check: HealthCheckConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix (e.g., "http://localhost:4000/api").
    pub base_url: String,

    /// Deadline for ordinary requests in seconds.
    pub request_timeout_secs: u64,

    /// Deadline for OTP requests in seconds (mail delivery is slow).
    pub otp_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".to_string(),
            request_timeout_secs: 60,
            otp_timeout_secs: 120,
        }
    }
}

impl ApiConfig {
    /// Backend origin without the trailing `/api` segment.
    pub fn origin(&self) -> &str {
        let trimmed = self.base_url.trim_end_matches('/');
        trimmed.strip_suffix("/api").unwrap_or(trimmed)
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Login endpoint; never carries a bearer token.
    pub login_path: String,

    /// Endpoints that get the extended OTP deadline.
    pub otp_paths: Vec<String>,

    /// JSON file backing the persisted `auth_token`/`auth_user` keys.
    /// In-memory only when unset; the CLI falls back to `azb-session.json`.
    pub storage_path: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            otp_paths: vec![
                "/auth/send-otp".to_string(),
                "/auth/verify-otp".to_string(),
                "/auth/resend-otp".to_string(),
                "/auth/reset-password".to_string(),
            ],
            storage_path: None,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Path probed on the backend origin.
    pub path: String,

    /// Health check timeout in seconds.
    pub timeout_secs: u64,

    /// How long a probe result is reused, in seconds.
    pub cache_ttl_secs: u64,

    /// Probe attempts made by the wake sequence.
    pub wake_attempts: u32,

    /// Base delay between wake attempts in milliseconds (scaled by attempt number).
    pub wake_base_delay_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: "/health".to_string(),
            timeout_secs: 5,
            cache_ttl_secs: 30,
            wake_attempts: 2,
            wake_base_delay_ms: 1500,
        }
    }
}

impl HealthCheckConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (2 means 3 attempts total).
    pub max_retries: u32,

    /// Base delay for linear backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Pause after a failed pre-flight wake before the next attempt.
    pub gate_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 2000,
            gate_delay_ms: 2000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for terminals, JSON for collectors.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:4000/api");
        assert_eq!(config.api.request_timeout_secs, 60);
        assert_eq!(config.api.otp_timeout_secs, 120);
        assert_eq!(config.health_check.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.retries.max_retries, 2);
        assert_eq!(config.auth.otp_paths.len(), 4);
    }

    #[test]
    fn test_origin_strips_api_segment() {
        let mut api = ApiConfig::default();
        assert_eq!(api.origin(), "http://localhost:4000");

        api.base_url = "https://backend.example.com/api/".to_string();
        assert_eq!(api.origin(), "https://backend.example.com");

        api.base_url = "https://backend.example.com".to_string();
        assert_eq!(api.origin(), "https://backend.example.com");
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://cold.example.com/api"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://cold.example.com/api");
        assert_eq!(config.api.request_timeout_secs, 60);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
