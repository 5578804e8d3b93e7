//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define BFF metrics (requests, latency, RPC outcomes, identity lookups)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `bff_requests_total` (counter): requests by method, status, route
//! - `bff_request_duration_seconds` (histogram): latency by route
//! - `bff_rpc_calls_total` (counter): upstream calls by rpc, gRPC code
//! - `bff_identity_lookups_total` (counter): identity resolution outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels stay low-cardinality (rule names, not raw paths)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    ::metrics::counter!(
        "bff_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);

    ::metrics::histogram!("bff_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of an upstream RPC.
pub fn record_rpc(rpc: &'static str, code: &'static str) {
    ::metrics::counter!("bff_rpc_calls_total", "rpc" => rpc, "code" => code).increment(1);
}

/// Record the outcome of an identity lookup.
pub fn record_identity_lookup(outcome: &'static str) {
    ::metrics::counter!("bff_identity_lookups_total", "outcome" => outcome).increment(1);
}
