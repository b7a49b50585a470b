//! Retry bookkeeping.
//!
//! # Responsibilities
//! - Track the attempt number of one logical call
//! - Enforce the retry ceiling (attempt never exceeds `max_retries`)
//! - Compute the linear delay before the next attempt
//!
//! # Design Decisions
//! - Only 503 and network failures are retried; everything else is final
//! - Login and health paths fail fast and are never retried
//! - A fresh context is created per call and threaded through the loop

use std::time::Duration;

use crate::http::request::RouteClass;
use crate::resilience::backoff::linear_backoff;

/// Why an attempt is being repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// Pre-flight wake failed; the real request was never sent.
    ColdBackend,
    /// Server answered 503.
    ServiceUnavailable,
    /// Timeout, refused connection, dropped socket.
    Network,
}

impl RetryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryReason::ColdBackend => "cold_backend",
            RetryReason::ServiceUnavailable => "service_unavailable",
            RetryReason::Network => "network",
        }
    }
}

/// State of one logical call across its attempts.
#[derive(Debug, Clone)]
pub struct RetryContext {
    pub attempt: u32,
    pub max_retries: u32,
    pub path: String,
    pub route: RouteClass,
}

impl RetryContext {
    pub fn new(path: &str, route: RouteClass, max_retries: u32) -> Self {
        Self {
            attempt: 0,
            max_retries,
            path: path.to_string(),
            route,
        }
    }

    pub fn is_first_attempt(&self) -> bool {
        self.attempt == 0
    }

    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_retries
    }

    /// Delay before the next attempt: `base * (attempt + 1)`.
    pub fn backoff(&self, base_ms: u64) -> Duration {
        linear_backoff(base_ms, self.attempt + 1)
    }

    /// Move to the next attempt. Returns false once the ceiling is reached.
    pub fn advance(&mut self) -> bool {
        if !self.can_retry() {
            return false;
        }
        self.attempt += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RetryContext {
        RetryContext::new("/products", RouteClass::default(), 2)
    }

    #[test]
    fn test_attempt_ceiling() {
        let mut ctx = context();
        assert!(ctx.is_first_attempt());
        assert!(ctx.advance());
        assert!(ctx.advance());
        assert!(!ctx.can_retry());
        assert!(!ctx.advance());
        assert_eq!(ctx.attempt, 2);
    }

    #[test]
    fn test_delays_follow_attempt_number() {
        let mut ctx = context();
        assert_eq!(ctx.backoff(2000), Duration::from_millis(2000));
        ctx.advance();
        assert_eq!(ctx.backoff(2000), Duration::from_millis(4000));
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(RetryReason::Network.as_str(), "network");
        assert_eq!(RetryReason::ServiceUnavailable.as_str(), "service_unavailable");
    }
}
