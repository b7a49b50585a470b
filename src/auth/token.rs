//! Bearer token validation.
//!
//! Tokens are JWTs (`header.payload.signature`). Only the payload's `exp`
//! claim is inspected; signatures are the server's business.
//!
//! Anything that cannot be read is treated as expired.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;

/// Tokens this close to `exp` are already considered expired.
pub const EXPIRY_SKEW: Duration = Duration::from_secs(5 * 60);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Check a token against the current wall clock.
pub fn is_expired(token: Option<&str>) -> bool {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    is_expired_at(token, u64::try_from(now_ms).unwrap_or(u64::MAX))
}

/// Check a token against an explicit time in Unix milliseconds.
pub fn is_expired_at(token: Option<&str>, now_ms: u64) -> bool {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return true,
    };

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return true;
    }

    let payload = match decode_payload(parts[1]) {
        Some(p) => p,
        None => {
            tracing::warn!("Bearer token payload could not be decoded; treating as expired");
            return true;
        }
    };

    let exp = match payload.get("exp") {
        None | Some(Value::Null) => return false,
        Some(exp) => exp,
    };

    let exp_secs = match exp.as_f64() {
        Some(secs) => secs,
        None => {
            tracing::warn!(exp = %exp, "Bearer token has a non-numeric exp claim; treating as expired");
            return true;
        }
    };

    let deadline_ms = exp_secs * 1000.0 - EXPIRY_SKEW.as_millis() as f64;
    now_ms as f64 >= deadline_ms
}

fn decode_payload(segment: &str) -> Option<Value> {
    let bytes = URL_SAFE_LENIENT
        .decode(segment)
        .or_else(|_| STANDARD_LENIENT.decode(segment))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}
