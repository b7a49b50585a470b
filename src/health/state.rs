//! Backend liveness state.
//!
//! # States
//! - Unknown: never probed (`last_checked_at` is `None`, treated as asleep)
//! - Awake: last probe answered 2xx
//! - Asleep: last probe failed, timed out or answered non-2xx
//!
//! A result younger than the cache TTL is reused without a new probe.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthState {
    pub is_awake: bool,
    pub last_checked_at: Option<Instant>,
}

impl HealthState {
    /// The cached verdict, if it is still inside `ttl`.
    pub fn fresh(&self, ttl: Duration) -> Option<bool> {
        match self.last_checked_at {
            Some(at) if at.elapsed() < ttl => Some(self.is_awake),
            _ => None,
        }
    }

    pub fn record(&mut self, is_awake: bool) {
        self.is_awake = is_awake;
        self.last_checked_at = Some(Instant::now());
    }
}
