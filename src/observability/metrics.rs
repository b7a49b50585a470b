//! Client metrics.
//!
//! # Metrics
//! - `azb_requests_total` (counter): logical calls by path kind and outcome
//! - `azb_request_duration_seconds` (histogram): wall time including retries
//! - `azb_retries_total` (counter): repeated attempts by reason
//! - `azb_health_probes_total` (counter): probe verdicts, cached or live
//! - `azb_auth_invalidations_total` (counter): sessions dropped
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding application installs a recorder.

use tokio::time::Instant;

pub fn record_request(path_kind: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!("azb_requests_total", "path_kind" => path_kind, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("azb_request_duration_seconds", "path_kind" => path_kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(reason: &'static str) {
    metrics::counter!("azb_retries_total", "reason" => reason).increment(1);
}

pub fn record_health_probe(is_awake: bool, cached: bool) {
    let result = if is_awake { "awake" } else { "asleep" };
    let cached = if cached { "true" } else { "false" };
    metrics::counter!("azb_health_probes_total", "result" => result, "cached" => cached)
        .increment(1);
}

pub fn record_auth_invalidation() {
    metrics::counter!("azb_auth_invalidations_total").increment(1);
}
