//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): HTTP requests by route, status
//! - `relay_request_duration_seconds` (histogram): HTTP latency by route
//! - `relay_outcomes_total` (counter): relay results by shape, outcome
//! - `relay_node_selection_total` (counter): node picks by source
//!   (`healthy`, `fallback`, `none`)

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled HTTP request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one relay attempt.
pub fn record_outcome(shape: &'static str, outcome: &'static str) {
    metrics::counter!("relay_outcomes_total", "shape" => shape, "outcome" => outcome).increment(1);
}

pub fn record_node_selection(source: &'static str) {
    metrics::counter!("relay_node_selection_total", "source" => source).increment(1);
}
