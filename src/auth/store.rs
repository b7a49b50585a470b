//! Bearer token ownership.
//!
//! # Responsibilities
//! - Hold the current token in memory
//! - Fall back to the persisted `auth_token` when memory is empty
//! - Clear memory and both persisted keys on invalidation
//!
//! TokenStore is the only writer of the session keys.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::storage::{KeyValueStore, AUTH_TOKEN_KEY, AUTH_USER_KEY};

pub struct TokenStore {
    current: ArcSwapOption<String>,
    storage: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            storage,
        }
    }

    /// Replace the in-memory token. Persistence is left to the caller.
    pub fn set(&self, token: Option<String>) {
        self.current.store(token.map(Arc::new));
    }

    /// Store a fresh session in memory and in both persisted keys.
    pub fn persist(&self, token: &str, user: Option<&str>) {
        self.set(Some(token.to_string()));

        if let Err(e) = self.storage.set(AUTH_TOKEN_KEY, token) {
            tracing::warn!(error = %e, "Failed to persist auth token");
        }
        if let Some(user) = user {
            if let Err(e) = self.storage.set(AUTH_USER_KEY, user) {
                tracing::warn!(error = %e, "Failed to persist auth user");
            }
        }
    }

    /// The in-memory token, else the persisted one.
    pub fn resolve(&self) -> Option<String> {
        if let Some(token) = self.current.load_full() {
            return Some(token.as_ref().clone());
        }

        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted auth token");
                None
            }
        }
    }

    /// The persisted user record, if any.
    pub fn user(&self) -> Option<String> {
        self.storage.get(AUTH_USER_KEY).ok().flatten()
    }

    /// Drop the in-memory token and remove both persisted keys.
    pub fn clear(&self) {
        self.current.store(None);

        for key in [AUTH_TOKEN_KEY, AUTH_USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove persisted session key");
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.current.load().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> (TokenStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (TokenStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_set_is_memory_only() {
        let (tokens, storage) = store();
        tokens.set(Some("a.b.c".into()));

        assert_eq!(tokens.resolve().as_deref(), Some("a.b.c"));
        assert!(storage.get(AUTH_TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_storage() {
        let (tokens, storage) = store();
        storage.set(AUTH_TOKEN_KEY, "x.y.z").unwrap();

        assert_eq!(tokens.resolve().as_deref(), Some("x.y.z"));

        tokens.set(Some("a.b.c".into()));
        assert_eq!(tokens.resolve().as_deref(), Some("a.b.c"));
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let (tokens, storage) = store();
        tokens.persist("a.b.c", Some(r#"{"name":"ops"}"#));
        assert_eq!(tokens.user().as_deref(), Some(r#"{"name":"ops"}"#));
        assert_eq!(storage.len(), 2);

        tokens.clear();
        assert!(tokens.resolve().is_none());
        assert!(tokens.user().is_none());
        assert!(storage.is_empty());

        // Clearing twice leaves the same state
        tokens.clear();
        assert!(tokens.resolve().is_none());
    }
}
