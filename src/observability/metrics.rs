//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by category and status
//! - `relay_request_duration_seconds` (histogram): time to response headers
//! - `relay_upstream_errors_total` (counter): failed outbound calls
//! - `relay_stream_chunks_total` (counter): event-stream frames written
//!
//! Updates go through the `metrics` facade and are no-ops until a recorder
//! is installed, so tests never need one.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

const LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full("relay_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install()?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed relay request.
pub fn record_request(category: &'static str, status: u16, start: Instant) {
    counter!(
        "relay_requests_total",
        "category" => category,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("relay_request_duration_seconds", "category" => category)
        .record(start.elapsed().as_secs_f64());
}

/// Record an outbound call that failed before a response was relayed.
pub fn record_upstream_error(category: &'static str) {
    counter!("relay_upstream_errors_total", "category" => category).increment(1);
}

/// Record one event-stream frame written to a client.
pub fn record_stream_chunk() {
    counter!("relay_stream_chunks_total").increment(1);
}
