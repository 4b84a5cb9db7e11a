//! Active health probing.
//!
//! # Responsibilities
//! - Probe `/health`, `/db-health` and `/db-reconnect`
//! - Update the connection status from the probe results
//!
//! # Design Decisions
//! - Probes bypass retries and classification; one shot each
//! - Probe failures degrade to negative results, never errors

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::health::state::ConnectionStatus;
use crate::http::{endpoint, ApiRequest, ApiResponse, RequestBody, Transport};
use crate::observability::metrics;

/// Result of `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemHealth {
    pub system: bool,
    pub database: bool,
}

/// Result of `GET /db-health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub is_connected: bool,
    #[serde(default)]
    pub ready_state: u8,
}

#[derive(Debug, Default, Deserialize)]
struct HealthBody {
    #[serde(default)]
    database: Option<DatabaseField>,
}

#[derive(Debug, Deserialize)]
struct DatabaseField {
    #[serde(default)]
    connected: bool,
}

#[derive(Debug, Deserialize)]
struct ReconnectBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

/// Issues health probes against the backend.
pub struct HealthChecker<T> {
    transport: Arc<T>,
    base_url: Url,
    status: Arc<ConnectionStatus>,
    probe_timeout: Duration,
    reconnect_timeout: Duration,
}

impl<T> Clone for HealthChecker<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            base_url: self.base_url.clone(),
            status: self.status.clone(),
            probe_timeout: self.probe_timeout,
            reconnect_timeout: self.reconnect_timeout,
        }
    }
}

impl<T: Transport> HealthChecker<T> {
    pub fn new(
        transport: Arc<T>,
        base_url: Url,
        status: Arc<ConnectionStatus>,
        probe_timeout: Duration,
        reconnect_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            base_url,
            status,
            probe_timeout,
            reconnect_timeout,
        }
    }

    pub fn status(&self) -> &Arc<ConnectionStatus> {
        &self.status
    }

    /// Probe `/health`, updating `db_connected` and the check timestamp.
    pub async fn check_system_health(&self) -> SystemHealth {
        let result = match self.probe(Method::GET, "health", self.probe_timeout).await {
            Some(response) => {
                let body: HealthBody = response.json().unwrap_or_default();
                let database = body.database.map(|d| d.connected).unwrap_or(false);
                self.status.record_health_check(database);
                SystemHealth {
                    system: true,
                    database,
                }
            }
            None => {
                self.status.touch_health_check();
                SystemHealth {
                    system: false,
                    database: false,
                }
            }
        };

        tracing::debug!(
            system = result.system,
            database = result.database,
            "System health check complete"
        );
        metrics::record_health_probe("health", result.system);
        metrics::record_connection_status(&self.status.snapshot());
        result
    }

    /// Probe `/db-health`, updating `db_connected`.
    pub async fn check_database_health(&self) -> DatabaseHealth {
        let result = match self.probe(Method::GET, "db-health", self.probe_timeout).await {
            Some(response) => match response.json::<DatabaseHealth>() {
                Ok(health) => {
                    self.status.set_db_connected(health.is_connected);
                    health
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed database health response");
                    DatabaseHealth {
                        is_connected: false,
                        ready_state: 0,
                    }
                }
            },
            None => DatabaseHealth {
                is_connected: false,
                ready_state: 0,
            },
        };

        metrics::record_health_probe("db-health", result.is_connected);
        result
    }

    /// Ask the backend to reconnect its database.
    ///
    /// On reported success the failure count is cleared and the database is
    /// marked connected. On failure nothing changes.
    pub async fn force_reconnect(&self) -> bool {
        tracing::info!("Requesting database reconnect");

        let success = match self
            .probe(Method::POST, "db-reconnect", self.reconnect_timeout)
            .await
        {
            Some(response) => match response.json::<ReconnectBody>() {
                Ok(body) if body.success => {
                    tracing::info!(message = %body.message, "Database reconnected");
                    true
                }
                Ok(body) => {
                    tracing::warn!(message = %body.message, "Database reconnect refused");
                    false
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed reconnect response");
                    false
                }
            },
            None => false,
        };

        if success {
            self.status.record_reconnect();
        }
        metrics::record_health_probe("db-reconnect", success);
        metrics::record_connection_status(&self.status.snapshot());
        success
    }

    /// One-shot request; `None` on transport failure or non-2xx status.
    async fn probe(&self, method: Method, path: &str, timeout: Duration) -> Option<ApiResponse> {
        let url = match endpoint(&self.base_url, path) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(path, error = %e, "Failed to build health check URL");
                return None;
            }
        };

        let mut request = ApiRequest::new(method, url, RequestBody::Empty, timeout);
        request.headers.insert(
            USER_AGENT,
            HeaderValue::from_static("hospital-client-health-check"),
        );

        match self.transport.send(&request).await {
            Ok(response) if response.is_success() => Some(response),
            Ok(response) => {
                tracing::warn!(path, status = response.status, "Health check failed: non-success status");
                None
            }
            Err(e) => {
                tracing::warn!(path, kind = e.kind.as_str(), error = %e.message, "Health check failed: no response");
                None
            }
        }
    }
}
