//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Pre-flight gate (ApiClient::request, first attempt only):
//!     → probe.rs check (cached for the TTL)
//!     → if asleep: wake.rs (bounded probes with linear pauses)
//!
//! Network failure on the first attempt:
//!     → wake.rs (no-op when the cache says awake)
//! ```
//!
//! # Design Decisions
//! - One probe result is shared by every in-flight call
//! - Failures refresh the cache just like successes
//! - Last writer wins; concurrent stale reads may both probe

pub mod probe;
pub mod state;
pub mod wake;

pub use probe::HealthProbe;
pub use state::HealthState;
pub use wake::WakeSequencer;
