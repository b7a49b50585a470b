//! Persistent key-value area backing the session.
//!
//! # Data Flow
//! ```text
//! TokenStore
//!     → KeyValueStore (trait)
//!         → MemoryStore (tests, ephemeral sessions)
//!         → FileStore (JSON object on disk)
//! ```
//!
//! # Design Decisions
//! - Only two keys are ever written by this crate: `auth_token`, `auth_user`
//! - Values are opaque strings; the store never interprets them
//! - Implementations are `Send + Sync` and shared behind `Arc`

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Persisted bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Persisted user record (opaque to this layer).
pub const AUTH_USER_KEY: &str = "auth_user";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
