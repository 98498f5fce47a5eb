//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, backend
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_admission_timeouts_total` (counter): requests rejected at the
//!   admission gate
//! - `proxy_upstream_failures_total` (counter): failures recorded into the
//!   rotation window, by backend
//! - `proxy_rotations_total` (counter): backend rotations, by from/to

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_exporter(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed (or rejected) inbound request.
pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_admission_timeout() {
    counter!("proxy_admission_timeouts_total").increment(1);
}

pub fn record_upstream_failure(backend: &str) {
    counter!("proxy_upstream_failures_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_rotation(from: &str, to: &str) {
    counter!(
        "proxy_rotations_total",
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}
