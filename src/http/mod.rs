//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (ApiClient::request, retry loop)
//!     → request.rs (classify path, build headers)
//!     → transport.rs (send under deadline)
//!     → response.rs (decode body by content type)
//!     → parsed value or ApiError
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use request::{RequestOptions, RouteClass, X_REQUEST_ID};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
