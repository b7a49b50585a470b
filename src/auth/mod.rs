//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! ApiClient::request
//!     → store.rs (resolve current token)
//!     → token.rs (reject expired tokens before any network call)
//!
//! On 401 or expired token:
//!     → store.rs clear (memory + persisted keys)
//!     → invalidation.rs broadcast
//! ```

pub mod invalidation;
pub mod store;
pub mod token;

pub use invalidation::{AuthInvalidated, AuthInvalidation, AUTH_INVALID_EVENT};
pub use store::TokenStore;
pub use token::{is_expired, is_expired_at};
