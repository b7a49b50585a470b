//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (race the call against its deadline)
//!     → On 503 or network failure: retries.rs (check ceiling, compute delay)
//!     → backoff.rs (linear delay: base * attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries are a bounded loop, never recursion
//! - Backoff is linear, not exponential

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::linear_backoff;
pub use retries::{RetryContext, RetryReason};
pub use timeouts::with_timeout;
