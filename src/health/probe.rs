//! Cached liveness probe.
//!
//! # Responsibilities
//! - GET `{origin}/health` with a short deadline
//! - Reuse a result younger than the cache TTL without touching the network
//! - Refresh the cache after every real probe, success or failure

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;

use crate::config::ClientConfig;
use crate::health::state::HealthState;
use crate::http::transport::{HttpRequest, Transport};
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;

pub struct HealthProbe {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
    ttl: Duration,
    state: Mutex<HealthState>,
}

impl HealthProbe {
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            url: format!("{}{}", config.api.origin(), config.health_check.path),
            timeout: config.health_check.timeout(),
            ttl: config.health_check.cache_ttl(),
            state: Mutex::new(HealthState::default()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True if the backend is responsive, from cache when fresh.
    pub async fn check(&self) -> bool {
        if let Some(is_awake) = self.state.lock().fresh(self.ttl) {
            metrics::record_health_probe(is_awake, true);
            return is_awake;
        }

        let is_awake = self.probe().await;
        self.state.lock().record(is_awake);
        metrics::record_health_probe(is_awake, false);
        is_awake
    }

    async fn probe(&self) -> bool {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let request = HttpRequest {
            method: Method::GET,
            url: self.url.clone(),
            headers,
            body: None,
            timeout: self.timeout,
        };

        match with_timeout(self.timeout, self.transport.send(request)).await {
            Ok(response) if response.is_success() => {
                tracing::debug!(url = %self.url, status = response.status, "Health check passed");
                true
            }
            Ok(response) => {
                tracing::warn!(url = %self.url, status = response.status, "Health check failed: non-success status");
                false
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Health check failed");
                false
            }
        }
    }

    pub fn snapshot(&self) -> HealthState {
        *self.state.lock()
    }

    /// Not known to be awake (never probed, or last probe failed).
    pub fn believed_asleep(&self) -> bool {
        !self.state.lock().is_awake
    }

    pub fn mark_awake(&self) {
        self.state.lock().is_awake = true;
    }
}

impl std::fmt::Debug for HealthProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthProbe")
            .field("url", &self.url)
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}
