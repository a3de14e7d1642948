//! Metrics collection and exposition.
//!
//! # Metrics
//! - `agro_requests_total` (counter): requests by method, status
//! - `agro_request_duration_seconds` (histogram): latency distribution
//! - `agro_rate_limited_total` (counter): requests rejected with 429
//! - `agro_rate_limit_clients` (gauge): clients holding a rate limit window
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is optional and runs its own listener

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "agro_requests_total",
        "method" => method.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("agro_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("agro_rate_limited_total").increment(1);
}

pub fn set_rate_limit_clients(clients: usize) {
    gauge!("agro_rate_limit_clients").set(clients as f64);
}
