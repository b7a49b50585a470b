//! Session invalidation signal.
//!
//! Other layers (session context, UI) subscribe and react when the
//! orchestrator decides the current session is no longer valid.

use tokio::sync::broadcast;

/// Name of the invalidation event, for listeners that log or bridge it.
pub const AUTH_INVALID_EVENT: &str = "azb-auth-invalid";

/// Payload-free invalidation notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthInvalidated;

impl AuthInvalidated {
    pub fn name(&self) -> &'static str {
        AUTH_INVALID_EVENT
    }
}

/// Broadcasts [`AuthInvalidated`] to every subscriber.
#[derive(Debug, Clone)]
pub struct AuthInvalidation {
    tx: broadcast::Sender<AuthInvalidated>,
}

impl AuthInvalidation {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to invalidation events.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthInvalidated> {
        self.tx.subscribe()
    }

    /// Send one event. Having no listeners is fine.
    pub fn notify(&self) {
        let _ = self.tx.send(AuthInvalidated);
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for AuthInvalidation {
    fn default() -> Self {
        Self::new()
    }
}
