//! Wake-up sequence for a sleeping backend.
//!
//! Hosts that idle a service out need a few requests before it answers.
//! The sequence re-runs the cached [`HealthProbe`] with linear pauses in
//! between. Attempts inside the probe's TTL see the cached verdict, so
//! only the pauses let later attempts observe a fresh probe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::health::probe::HealthProbe;
use crate::resilience::backoff::linear_backoff;

#[derive(Debug)]
pub struct WakeSequencer {
    probe: Arc<HealthProbe>,
    waking_up: AtomicBool,
}

impl WakeSequencer {
    pub fn new(probe: Arc<HealthProbe>) -> Self {
        Self {
            probe,
            waking_up: AtomicBool::new(false),
        }
    }

    /// Try to bring the backend up. True once it answers.
    ///
    /// Returns immediately if the backend is not believed asleep. Sleeps
    /// `base_delay_ms * attempt` between attempts.
    pub async fn wake(&self, max_attempts: u32, base_delay_ms: u64) -> bool {
        if !self.probe.believed_asleep() {
            return true;
        }

        self.waking_up.store(true, Ordering::SeqCst);
        tracing::info!(max_attempts, "Backend appears asleep, waking it up");

        for attempt in 1..=max_attempts {
            if self.probe.check().await {
                self.probe.mark_awake();
                self.waking_up.store(false, Ordering::SeqCst);
                tracing::info!(attempt, "Backend is awake");
                return true;
            }

            if attempt < max_attempts {
                let delay = linear_backoff(base_delay_ms, attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Backend still asleep");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::warn!(max_attempts, "Backend did not wake up");
        false
    }

    /// Set while a wake-up has started and no call has succeeded since.
    pub fn is_waking_up(&self) -> bool {
        self.waking_up.load(Ordering::SeqCst)
    }

    /// Clear the waking flag, returning whether it was set.
    pub fn clear_waking(&self) -> bool {
        self.waking_up.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::transport::{HttpRequest, HttpResponse, Transport, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Answers 2xx from the `awake_from`-th probe onwards.
    struct ColdBackend {
        calls: AtomicUsize,
        awake_from: usize,
    }

    #[async_trait]
    impl Transport for ColdBackend {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.awake_from {
                Ok(HttpResponse { status: 200, content_type: None, body: String::new() })
            } else {
                Ok(HttpResponse { status: 503, content_type: None, body: String::new() })
            }
        }
    }

    fn sequencer(awake_from: usize, ttl_secs: u64) -> (WakeSequencer, Arc<ColdBackend>) {
        let backend = Arc::new(ColdBackend { calls: AtomicUsize::new(0), awake_from });
        let mut config = ClientConfig::default();
        config.health_check.cache_ttl_secs = ttl_secs;
        let probe = Arc::new(HealthProbe::new(backend.clone(), &config));
        (WakeSequencer::new(probe), backend)
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_when_awake() {
        let (waker, backend) = sequencer(1, 30);
        assert!(waker.probe.check().await);

        assert!(waker.wake(2, 1500).await);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(!waker.is_waking_up());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_verdict_inside_ttl() {
        let (waker, backend) = sequencer(2, 30);
        assert!(!waker.probe.check().await);

        // Both attempts land inside the 30s window and never re-probe
        let started = tokio::time::Instant::now();
        assert!(!waker.wake(2, 1500).await);
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(waker.is_waking_up());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wakes_once_cache_expires() {
        let (waker, backend) = sequencer(2, 1);

        let started = tokio::time::Instant::now();
        assert!(waker.wake(3, 1500).await);
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert!(!waker.is_waking_up());
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_pauses() {
        let (waker, backend) = sequencer(usize::MAX, 1);

        let started = tokio::time::Instant::now();
        assert!(!waker.wake(3, 1000).await);
        // 1000 + 2000, no pause after the last attempt
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

        assert!(waker.clear_waking());
        assert!(!waker.clear_waking());
    }
}
