//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_outbound_requests_total` (counter): outbound calls by transport, outcome
//! - `relay_outbound_request_duration_seconds` (histogram): outbound latency by transport
//! - `relay_token_issuance_total` (counter): session token attempts by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so tests and
//!   library users pay nothing
//! - Prometheus scrape endpoint on its own listener

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one outbound request.
pub fn record_outbound_request(transport: &'static str, outcome: &'static str, start: Instant) {
    counter!(
        "relay_outbound_requests_total",
        "transport" => transport,
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "relay_outbound_request_duration_seconds",
        "transport" => transport
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a session token issuance attempt.
pub fn record_token_issuance(outcome: &'static str) {
    counter!("relay_token_issuance_total", "outcome" => outcome).increment(1);
}
