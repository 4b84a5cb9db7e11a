//! Metrics collection and exposition.
//!
//! # Metrics
//! - `client_requests_total` (counter): attempts by method, status (0 = no response)
//! - `client_request_duration_seconds` (histogram): per-attempt latency
//! - `client_retries_total` (counter): retries by reason
//! - `client_health_probes_total` (counter): probes by endpoint, outcome
//! - `client_consecutive_failures` (gauge)
//! - `client_online` / `client_db_connected` (gauge): 1 = yes, 0 = no

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::ConnectionSnapshot;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("client_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_retry(reason: &str) {
    counter!("client_retries_total", "reason" => reason.to_string()).increment(1);
}

pub fn record_health_probe(endpoint: &'static str, ok: bool) {
    counter!(
        "client_health_probes_total",
        "endpoint" => endpoint,
        "outcome" => if ok { "ok" } else { "failed" }
    )
    .increment(1);
}

pub fn record_connection_status(snapshot: &ConnectionSnapshot) {
    gauge!("client_consecutive_failures").set(snapshot.consecutive_failures as f64);
    gauge!("client_online").set(if snapshot.is_online { 1.0 } else { 0.0 });
    gauge!("client_db_connected").set(if snapshot.db_connected { 1.0 } else { 0.0 });
}
