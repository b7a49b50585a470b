//! Request orchestrator.
//!
//! # Responsibilities
//! - Attach the session token, rejecting expired ones before any I/O
//! - Gate the first attempt on backend liveness, waking it if needed
//! - Race every call against its deadline
//! - Classify responses and failures; retry 503 and network errors
//! - Invalidate the session on 401
//!
//! # Retry Loop
//! ```text
//! attempt 0: token check → health gate → send
//!     asleep after wake  → sleep gate_delay, attempt 1 (request never sent)
//!     503                → sleep base * (attempt + 1), next attempt
//!     network failure    → wake (attempt 0 only), sleep base * (attempt + 1), next attempt
//!     401 (not login)    → clear session, broadcast, fail
//!     other non-2xx      → fail with body message
//! ```
//!
//! # Design Decisions
//! - One `ApiClient` owns all shared state; clone it to share
//! - A bounded loop replaces recursion; the attempt counter is the only
//!   state carried between iterations
//! - Login and health calls never carry a token and never take the
//!   network retry path

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{is_expired, AuthInvalidated, AuthInvalidation, TokenStore};
use crate::config::validation::validate_config;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::health::{HealthProbe, WakeSequencer};
use crate::http::request::{build_request, RequestOptions, RouteClass};
use crate::http::response::parse_body;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::observability::metrics;
use crate::resilience::{with_timeout, RetryContext, RetryReason};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Resilient client for the backend API.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
    probe: Arc<HealthProbe>,
    waker: Arc<WakeSequencer>,
    invalidation: AuthInvalidation,
}

impl ApiClient {
    /// Client with the reqwest transport and storage chosen by `config`.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Issue one logical call, retrying as needed. Returns the parsed body.
    #[instrument(skip(self, options), fields(method = %options.method, request_id = tracing::field::Empty))]
    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let start = Instant::now();
        let route = RouteClass::classify(path, &self.config);
        let result = self.run(path, &options, route, &request_id).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ApiError::SessionExpired { .. }) => "session_expired",
            Err(ApiError::Http { .. }) => "http_error",
            Err(ApiError::ServerStarting { .. }) | Err(ApiError::Transport(_)) => "network_error",
            Err(_) => "error",
        };
        metrics::record_request(route.label(), outcome, start);

        result
    }

    async fn run(
        &self,
        path: &str,
        options: &RequestOptions,
        route: RouteClass,
        request_id: &str,
    ) -> ApiResult<Value> {
        let retries = &self.config.retries;
        let health = &self.config.health_check;
        let url = format!("{}{}", self.config.api.base_url.trim_end_matches('/'), path);
        let timeout = route.timeout(&self.config);
        let mut ctx = RetryContext::new(path, route, retries.max_retries);

        loop {
            // 1. Session
            let bearer = if route.bypasses_session() {
                None
            } else {
                self.tokens.resolve()
            };
            if let Some(token) = bearer.as_deref() {
                if is_expired(Some(token)) {
                    warn!(path, "Session token expired before request");
                    self.clear_invalid_auth();
                    return Err(ApiError::SessionExpired { data: None });
                }
            }

            // 2. Pre-flight health gate
            if ctx.is_first_attempt() && !route.bypasses_session() && !self.probe.check().await {
                let awake = self
                    .waker
                    .wake(health.wake_attempts, health.wake_base_delay_ms)
                    .await;
                if !awake && ctx.can_retry() {
                    self.pause(&mut ctx, RetryReason::ColdBackend, Duration::from_millis(retries.gate_delay_ms))
                        .await;
                    continue;
                }
            }

            // 3. Send
            debug!(path, attempt = ctx.attempt, "Sending request");
            let request = build_request(url.clone(), options, timeout, bearer.as_deref(), request_id)?;
            let failure = match with_timeout(timeout, self.transport.send(request)).await {
                Ok(response) => {
                    let data = parse_body(&response)?;

                    if response.is_success() {
                        if self.waker.clear_waking() {
                            info!("Backend is responding again");
                        }
                        return Ok(data);
                    }

                    if response.status == 401 && !route.is_login {
                        warn!(path, "Server rejected session");
                        self.clear_invalid_auth();
                        return Err(ApiError::SessionExpired { data: Some(data) });
                    }

                    if response.status == 503 && ctx.can_retry() {
                        let delay = ctx.backoff(retries.base_delay_ms);
                        self.pause(&mut ctx, RetryReason::ServiceUnavailable, delay).await;
                        continue;
                    }

                    return Err(ApiError::from_response(response.status, data));
                }
                Err(e) => e,
            };

            // 4. Network failure
            if !failure.is_network() {
                return Err(ApiError::Transport(failure));
            }

            if !route.bypasses_session() && ctx.can_retry() {
                warn!(path, attempt = ctx.attempt, error = %failure, "Network failure");
                if ctx.is_first_attempt() {
                    self.waker
                        .wake(health.wake_attempts, health.wake_base_delay_ms)
                        .await;
                }
                let delay = ctx.backoff(retries.base_delay_ms);
                self.pause(&mut ctx, RetryReason::Network, delay).await;
                continue;
            }

            if ctx.can_retry() {
                // Login and health calls fail fast with the raw error
                return Err(ApiError::Transport(failure));
            }

            warn!(path, attempts = ctx.attempt + 1, error = %failure, "Network retries exhausted");
            return Err(ApiError::ServerStarting { source: failure });
        }
    }

    async fn pause(&self, ctx: &mut RetryContext, reason: RetryReason, delay: Duration) {
        info!(
            path = %ctx.path,
            attempt = ctx.attempt,
            reason = reason.as_str(),
            delay_ms = delay.as_millis() as u64,
            "Retrying request"
        );
        metrics::record_retry(reason.as_str());
        tokio::time::sleep(delay).await;
        ctx.advance();
    }

    /// [`request`](Self::request), deserializing the body into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let value = self.request(path, options).await?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidBody(e.to_string()))
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(path, RequestOptions::get()).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.request(path, RequestOptions::post().json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.request(path, RequestOptions::put().json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.request(path, RequestOptions::patch().json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(path, RequestOptions::delete()).await
    }

    /// One cached liveness check.
    pub async fn health_check(&self) -> bool {
        self.probe.check().await
    }

    /// Run the wake sequence with explicit bounds.
    pub async fn wake(&self, max_attempts: u32, base_delay_ms: u64) -> bool {
        self.waker.wake(max_attempts, base_delay_ms).await
    }

    pub fn is_server_waking_up(&self) -> bool {
        self.waker.is_waking_up()
    }

    /// Start a session: token in memory and both persisted keys.
    pub fn login_with(&self, token: &str, user: Option<&str>) {
        self.tokens.persist(token, user);
    }

    /// Replace the in-memory token only.
    pub fn set_token(&self, token: Option<String>) {
        self.tokens.set(token);
    }

    /// Voluntary sign-out. Clears the session without broadcasting.
    pub fn logout(&self) {
        self.tokens.clear();
    }

    /// Drop an invalid session and tell every listener.
    pub fn clear_invalid_auth(&self) {
        self.tokens.clear();
        metrics::record_auth_invalidation();
        self.invalidation.notify();
    }

    pub fn subscribe_auth_invalid(&self) -> tokio::sync::broadcast::Receiver<AuthInvalidated> {
        self.invalidation.subscribe()
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.api.base_url)
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl ApiClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the network transport (defaults to reqwest).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override session storage (defaults to `auth.storage_path` or memory).
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> ApiResult<ApiClient> {
        let config = self.config.unwrap_or_default();
        validate_config(&config).map_err(|errors| {
            let joined = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            ApiError::Internal(format!("Invalid client configuration: {}", joined))
        })?;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        let storage: Arc<dyn KeyValueStore> = match (self.storage, &config.auth.storage_path) {
            (Some(storage), _) => storage,
            (None, Some(path)) => Arc::new(FileStore::open(path).map_err(|e| {
                ApiError::Internal(format!("Failed to open session storage: {}", e))
            })?),
            (None, None) => Arc::new(MemoryStore::new()),
        };

        let probe = Arc::new(HealthProbe::new(transport.clone(), &config));
        let waker = Arc::new(WakeSequencer::new(probe.clone()));

        tracing::debug!(
            base_url = %config.api.base_url,
            health_url = %probe.url(),
            "API client initialized"
        );

        Ok(ApiClient {
            config: Arc::new(config),
            transport,
            tokens: Arc::new(TokenStore::new(storage)),
            probe,
            waker,
            invalidation: AuthInvalidation::new(),
        })
    }
}
