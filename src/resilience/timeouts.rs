//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race a network call against a deadline
//! - Preserve the call's own success or error when it finishes first
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Losing the race drops the inner future, which aborts the underlying
//!   connection instead of leaving it to finish in the background

use std::future::Future;
use std::time::Duration;

use crate::http::transport::TransportError;

/// Run `call` with a deadline of `limit`.
pub async fn with_timeout<F, T>(limit: Duration, call: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(limit.as_millis() as u64)),
    }
}
