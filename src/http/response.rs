//! Response body decoding.
//!
//! A body is parsed as JSON only when the server says so; anything else
//! comes back as a JSON string holding the raw text.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::transport::HttpResponse;

/// Whether a `Content-Type` value declares JSON.
pub fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Decode a buffered response by its declared content type.
pub fn parse_body(response: &HttpResponse) -> Result<Value, ApiError> {
    if is_json(response.content_type.as_deref()) {
        serde_json::from_str(&response.body).map_err(|e| ApiError::InvalidBody(e.to_string()))
    } else {
        Ok(Value::String(response.body.clone()))
    }
}
