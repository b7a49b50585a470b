//! Resilient API client for cold-starting backends.
//!
//! Every call goes through [`ApiClient::request`], which survives a
//! sleeping backend, transient network and 5xx failures, and expired
//! sessions behind one uniform contract.

pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use http::{ApiClient, ApiClientBuilder, RequestOptions};
