//! Linear backoff.
//!
//! Delays grow as `base * n` (2s, 4s, 6s for a 2s base). No jitter: the
//! delays are part of the observable contract.

use std::time::Duration;

/// Delay before the `n`-th attempt of a sequence (`n` starts at 1).
pub fn linear_backoff(base_ms: u64, n: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(n)))
}
