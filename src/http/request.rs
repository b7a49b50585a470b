//! Request description and classification.
//!
//! # Responsibilities
//! - Classify a path (login, health, OTP) to pick timeout and auth rules
//! - Merge caller headers over the JSON default
//! - Attach the bearer token and request ID
//!
//! # Design Decisions
//! - Classification matches whole path segments, ignoring the query string
//! - Caller headers override `Content-Type`; `Authorization` is always ours

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::transport::HttpRequest;

/// Header carrying the per-call correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// What kind of endpoint a path refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteClass {
    pub is_login: bool,
    pub is_health_check: bool,
    pub is_otp: bool,
}

impl RouteClass {
    pub fn classify(path: &str, config: &ClientConfig) -> Self {
        Self {
            is_login: matches_route(path, &config.auth.login_path),
            is_health_check: matches_route(path, &config.health_check.path),
            is_otp: config
                .auth
                .otp_paths
                .iter()
                .any(|otp| matches_route(path, otp)),
        }
    }

    /// Login and health calls never carry a token and never retry.
    pub fn bypasses_session(&self) -> bool {
        self.is_login || self.is_health_check
    }

    pub fn timeout(&self, config: &ClientConfig) -> Duration {
        if self.is_otp {
            Duration::from_secs(config.api.otp_timeout_secs)
        } else {
            Duration::from_secs(config.api.request_timeout_secs)
        }
    }

    /// Metrics label.
    pub fn label(&self) -> &'static str {
        if self.is_login {
            "login"
        } else if self.is_health_check {
            "health"
        } else if self.is_otp {
            "otp"
        } else {
            "api"
        }
    }
}

/// `path` is `route` or lies below it, once the query and fragment are dropped.
fn matches_route(path: &str, route: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let route = route.trim_end_matches('/');
    match path.strip_prefix(route) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Caller-supplied parts of a request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Raw body, sent as-is.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(value)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize body: {}", e)))?;
        self.body = Some(body);
        Ok(self)
    }
}

/// Resolve options into a wire request.
pub fn build_request(
    url: String,
    options: &RequestOptions,
    timeout: Duration,
    bearer: Option<&str>,
    request_id: &str,
) -> Result<HttpRequest, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Internal(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::Internal(format!("Invalid value for header '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    if let Some(token) = bearer {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Internal("Bearer token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, value);
    }

    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, value);
    }

    Ok(HttpRequest {
        method: options.method.clone(),
        url,
        headers,
        body: options.body.clone(),
        timeout,
    })
}
