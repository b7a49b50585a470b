//! Error contract returned to callers of [`ApiClient`](crate::ApiClient).
//!
//! HTTP-originated failures expose [`ErrorResponse`] through
//! [`ApiError::response`]; everything else is a plain error.

use serde_json::Value;
use thiserror::Error;

use crate::http::transport::TransportError;

/// Message shown once network retries are exhausted.
pub const SERVER_STARTING_MESSAGE: &str =
    "Server may be starting up. Please wait a moment and try again.";

/// Message carried by session expiry errors.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Status and parsed body of a failed HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub data: Value,
}

/// Errors surfaced by the request orchestrator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token expired before the call, or the server answered 401.
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired { data: Option<Value> },

    /// Non-2xx response that was not retried, or 503 after retries ran out.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        data: Value,
    },

    /// Network failures persisted through every retry.
    #[error("{}", SERVER_STARTING_MESSAGE)]
    ServerStarting {
        #[source]
        source: TransportError,
    },

    /// Network failure on a path that is never retried.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Declared JSON body that did not parse.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// Request could not be built or the client is misconfigured.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status and body, when the failure came from a response.
    pub fn response(&self) -> Option<ErrorResponse> {
        match self {
            ApiError::SessionExpired { data } => Some(ErrorResponse {
                status: 401,
                data: data.clone().unwrap_or(Value::Null),
            }),
            ApiError::Http { status, data, .. } => Some(ErrorResponse {
                status: *status,
                data: data.clone(),
            }),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }

    /// Build the error for a non-2xx body.
    ///
    /// The message is `data.error`, else `data.message`, else
    /// "Request failed", suffixed with `: <details>` when present.
    pub fn from_response(status: u16, data: Value) -> Self {
        let base = ["error", "message"]
            .iter()
            .filter_map(|key| data.get(*key))
            .find_map(non_empty_text)
            .unwrap_or_else(|| "Request failed".to_string());

        let message = match data.get("details").and_then(non_empty_text) {
            Some(details) => format!("{}: {}", base, details),
            None => base,
        };

        ApiError::Http {
            status,
            message,
            data,
        }
    }
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;
