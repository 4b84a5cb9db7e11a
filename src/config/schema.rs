//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::http::TransportErrorKind;

/// Root configuration for the hospital API client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend endpoints.
    pub api: ApiConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Background health probing.
    pub health_check: HealthCheckConfig,

    /// Where the bearer token and role are persisted.
    pub credentials: CredentialsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL used when the runtime host is not a local one.
    pub production_base_url: String,

    /// Base URL used when running against a local host.
    pub development_base_url: String,

    /// Host name used to pick the base URL. Falls back to `$HOSTNAME`.
    pub host: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            production_base_url: "https://api.hospital.example/api".to_string(),
            development_base_url: "http://localhost:5000/api".to_string(),
            host: None,
        }
    }
}

/// Timeout configuration for the different kinds of calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Default request timeout in seconds.
    pub request_secs: u64,

    /// Timeout for `/health` and `/db-health` probes in seconds.
    pub health_check_secs: u64,

    /// Timeout for `/db-reconnect` in seconds.
    pub reconnect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 45,
            health_check_secs: 10,
            reconnect_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per logical call, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// HTTP statuses that are worth another attempt.
    pub retryable_statuses: Vec<u16>,

    /// Transport failures that are worth another attempt.
    pub retryable_transport_errors: Vec<TransportErrorKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            retryable_statuses: vec![408, 429, 500, 502, 503, 504],
            retryable_transport_errors: vec![
                TransportErrorKind::ConnectionAborted,
                TransportErrorKind::TimedOut,
                TransportErrorKind::HostNotFound,
                TransportErrorKind::ConnectionRefused,
                TransportErrorKind::NetworkUnreachable,
            ],
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Run the background monitor.
    pub enabled: bool,

    /// Background tick interval in seconds.
    pub interval_secs: u64,

    /// A quiet client still probes once the last check is older than this.
    pub stale_after_secs: u64,

    /// Failure count above which each request kicks off an out-of-band probe.
    pub failure_probe_threshold: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 120,
            stale_after_secs: 300,
            failure_probe_threshold: 5,
        }
    }
}

/// Credential persistence.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// JSON file holding the token and role. Memory-only when unset.
    pub path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable logs.
    pub json_logs: bool,

    /// Calls slower than this are logged at warn level.
    pub slow_request_ms: u64,

    /// Enable the Prometheus endpoint in the monitor binary.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            slow_request_ms: 5000,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
