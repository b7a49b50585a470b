//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Every logical call runs inside a span carrying its request ID, which is
//! also sent to the backend as `X-Request-Id`.
//! ```

pub mod logging;
pub mod metrics;
