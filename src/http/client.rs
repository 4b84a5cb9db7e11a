//! The API client.
//!
//! # Responsibilities
//! - Single entry point for every outbound call
//! - Run interceptors, the retry loop and the classifier in order
//! - Apply classification effects to the connection status and session
//! - Recover once from database outages through a forced reconnect
//!
//! # Design Decisions
//! - Connection status and session are injected, never global
//! - The transport is a trait so the resilience logic runs without a network
//! - Background probes are fire-and-forget; their failures are only logged

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::auth::{CredentialError, CredentialStore, Session};
use crate::config::{ApiConfig, ClientConfig};
use crate::health::{
    passive, ConnectionSnapshot, ConnectionStatus, DatabaseHealth, HealthChecker, SystemHealth,
};
use crate::http::error::{ApiError, ApiResult, TransportError};
use crate::http::request::{self, ApiRequest, Multipart, RequestBody};
use crate::http::response::{self, ApiResponse};
use crate::http::transport::{ReqwestTransport, Transport};
use crate::observability::{metrics, tracing as request_tracing};
use crate::resilience::{classify, run_with_retries, Classification, RetryPolicy};

/// Error building a client from configuration.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("Failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Pick the development base URL for local hosts, production otherwise.
pub fn select_base_url<'a>(api: &'a ApiConfig, host: Option<&str>) -> &'a str {
    let host = host.unwrap_or_default().trim().to_ascii_lowercase();
    let local = matches!(host.as_str(), "localhost" | "127.0.0.1" | "::1" | "[::1]")
        || host.ends_with(".local")
        || host.ends_with(".localhost");

    if local {
        &api.development_base_url
    } else {
        &api.production_base_url
    }
}

/// Resolve `path` against `base`, keeping the base path (`/api`) intact.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path);
    }
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{}/{}", base, path))
}

struct ClientInner<T> {
    transport: Arc<T>,
    base_url: Url,
    policy: RetryPolicy,
    status: Arc<ConnectionStatus>,
    session: Arc<Session>,
    health: HealthChecker<T>,
    request_timeout: Duration,
    slow_request: Duration,
    failure_probe_threshold: u32,
}

/// Resilient client for the hospital backend.
///
/// Cheap to clone; clones share the transport, status and session.
pub struct ApiClient<T = ReqwestTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    /// Build a client with the `reqwest` transport.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientBuildError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeouts.connect_secs))?;

        let credentials = match &config.credentials.path {
            Some(path) => CredentialStore::open(path)?,
            None => CredentialStore::in_memory(),
        };

        let host = config
            .api
            .host
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok());
        let base_url = Url::parse(select_base_url(&config.api, host.as_deref()))?;

        tracing::info!(
            base_url = %base_url,
            host = host.as_deref().unwrap_or("unknown"),
            "API client configured"
        );

        Ok(Self::new(
            transport,
            base_url,
            config,
            Arc::new(Session::new(credentials)),
            Arc::new(ConnectionStatus::new()),
        ))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(
        transport: T,
        base_url: Url,
        config: &ClientConfig,
        session: Arc<Session>,
        status: Arc<ConnectionStatus>,
    ) -> Self {
        let transport = Arc::new(transport);
        let health = HealthChecker::new(
            transport.clone(),
            base_url.clone(),
            status.clone(),
            Duration::from_secs(config.timeouts.health_check_secs),
            Duration::from_secs(config.timeouts.reconnect_secs),
        );

        Self {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                policy: RetryPolicy::from_config(&config.retries),
                status,
                session,
                health,
                request_timeout: Duration::from_secs(config.timeouts.request_secs),
                slow_request: Duration::from_millis(config.observability.slow_request_ms),
                failure_probe_threshold: config.health_check.failure_probe_threshold,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn connection(&self) -> &Arc<ConnectionStatus> {
        &self.inner.status
    }

    pub fn health(&self) -> &HealthChecker<T> {
        &self.inner.health
    }

    /// Copy of the current connection status.
    pub fn status(&self) -> ConnectionSnapshot {
        self.inner.status.snapshot()
    }

    pub async fn check_system_health(&self) -> SystemHealth {
        self.inner.health.check_system_health().await
    }

    pub async fn check_database_health(&self) -> DatabaseHealth {
        self.inner.health.check_database_health().await
    }

    pub async fn force_reconnect(&self) -> bool {
        self.inner.health.force_reconnect().await
    }

    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::GET, path, RequestBody::Empty).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiResponse> {
        self.send(Method::POST, path, json_body(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiResponse> {
        self.send(Method::PUT, path, json_body(body)?).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::DELETE, path, RequestBody::Empty).await
    }

    /// POST a multipart body.
    pub async fn upload(&self, path: &str, multipart: Multipart) -> ApiResult<ApiResponse> {
        self.send(Method::POST, path, RequestBody::Multipart(multipart))
            .await
    }

    /// Issue a call through the full pipeline.
    pub async fn send(&self, method: Method, path: &str, body: RequestBody) -> ApiResult<ApiResponse> {
        let url = endpoint(&self.inner.base_url, path)?;
        let request = ApiRequest::new(method, url, body, self.inner.request_timeout);

        self.probe_if_degraded();

        match self.execute(request.clone()).await {
            Err(err) if err.is_database_failure() => {
                tracing::warn!(url = %request.url, "Database unavailable, attempting reconnect");
                if self.inner.health.force_reconnect().await {
                    tracing::info!(url = %request.url, "Reissuing request after reconnect");
                    self.execute(request).await
                } else {
                    Err(err)
                }
            }
            other => other,
        }
    }

    /// One logical call: interceptors, retries, classification.
    async fn execute(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let request_id = Uuid::new_v4().to_string();
        let credentials = self.inner.session.credentials();
        request::intercept(&mut request, credentials.as_deref(), &request_id);

        let span = request_tracing::request_span(&request);
        self.run(&request).instrument(span).await
    }

    async fn run(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let inner = &*self.inner;
        let transport = &*inner.transport;
        let slow_request = inner.slow_request;

        let result = run_with_retries(&inner.policy, &inner.status, move |attempt| async move {
            let started = Instant::now();
            let outcome = transport.send(request).await;
            let elapsed = started.elapsed();

            response::log_attempt(request, &attempt, elapsed, slow_request, &outcome);
            metrics::record_request(
                request.method.as_str(),
                outcome.as_ref().map(|r| r.status).unwrap_or(0),
                elapsed,
            );
            outcome
        })
        .await;

        match result {
            Ok(response) => {
                metrics::record_connection_status(&inner.status.snapshot());
                Ok(response)
            }
            Err(failure) => {
                let Classification { error, effects } = classify(failure);
                passive::apply_effects(&inner.status, &effects);
                if effects.end_session {
                    inner.session.expire();
                }

                tracing::warn!(
                    status = ?error.status(),
                    consecutive_failures = inner.status.consecutive_failures(),
                    error = %error,
                    "Request failed"
                );
                Err(error)
            }
        }
    }

    /// Kick off a background `/health` probe when failures pile up.
    fn probe_if_degraded(&self) {
        let failures = self.inner.status.consecutive_failures();
        if failures <= self.inner.failure_probe_threshold {
            return;
        }

        tracing::debug!(failures, "Connection degraded, probing health in background");
        let health = self.inner.health.clone();
        tokio::spawn(async move {
            let result = health.check_system_health().await;
            if !result.system {
                tracing::warn!("Background health probe failed");
            }
        });
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> ApiResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(ApiError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credentials, Role};
    use crate::http::testing::ScriptedTransport;
    use crate::http::{TransportErrorKind, X_REQUEST_ID};
    use reqwest::header::AUTHORIZATION;

    fn client(outcomes: Vec<Result<ApiResponse, TransportError>>) -> ApiClient<ScriptedTransport> {
        ApiClient::new(
            ScriptedTransport::new(outcomes),
            Url::parse("http://localhost:5000/api").unwrap(),
            &ClientConfig::default(),
            Arc::new(Session::new(CredentialStore::in_memory())),
            Arc::new(ConnectionStatus::new()),
        )
    }

    fn transport(client: &ApiClient<ScriptedTransport>) -> &ScriptedTransport {
        &client.inner.transport
    }

    fn ok(body: &str) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse::new(200, body))
    }

    fn status(code: u16) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse::new(code, ""))
    }

    fn reconnect(success: bool) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse::new(
            200,
            format!(r#"{{"success":{},"message":"reconnect"}}"#, success),
        ))
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_select_base_url() {
        let api = ApiConfig::default();
        assert_eq!(select_base_url(&api, Some("localhost")), api.development_base_url);
        assert_eq!(select_base_url(&api, Some("127.0.0.1")), api.development_base_url);
        assert_eq!(select_base_url(&api, Some("ward-7.local")), api.development_base_url);
        assert_eq!(
            select_base_url(&api, Some("www.hospital.example")),
            api.production_base_url
        );
        assert_eq!(select_base_url(&api, None), api.production_base_url);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://localhost:5000/api/").unwrap();
        assert_eq!(
            endpoint(&base, "/blogs/42").unwrap().as_str(),
            "http://localhost:5000/api/blogs/42"
        );
        assert_eq!(
            endpoint(&base, "health").unwrap().as_str(),
            "http://localhost:5000/api/health"
        );
        assert_eq!(
            endpoint(&base, "https://cdn.example/x").unwrap().as_str(),
            "https://cdn.example/x"
        );
    }

    #[tokio::test]
    async fn test_success_returns_response_unchanged() {
        let client = client(vec![ok(r#"{"data":[]}"#)]);
        client
            .session()
            .login(Credentials {
                token: "secret".into(),
                role: Role::Admin,
            })
            .unwrap();

        let response = client.get("/blogs").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), r#"{"data":[]}"#);

        let sent = transport(&client).requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headers.get(AUTHORIZATION).unwrap(), "Bearer secret");
        assert!(sent[0].headers.contains_key(X_REQUEST_ID));
        assert_eq!(sent[0].timeout, Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_share_request_id() {
        let client = client(vec![status(502), status(500), ok("{}")]);
        client.connection().record_failure();

        client.get("/doctors").await.unwrap();

        let sent = transport(&client).requests();
        assert_eq!(sent.len(), 3);
        let ids: Vec<_> = sent.iter().map(|r| r.request_id().unwrap().to_string()).collect();
        assert!(ids.iter().all(|id| id == &ids[0]));
        assert_eq!(client.status().consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_503_marks_database_down() {
        let mut outcomes = Vec::new();
        for _ in 0..3 {
            outcomes.extend([status(503), status(503), status(503), reconnect(false)]);
        }
        outcomes.push(ok("{}"));
        let client = client(outcomes);

        for _ in 0..3 {
            let err = client.get("/events").await.unwrap_err();
            assert!(matches!(err, ApiError::ServiceUnavailable));
        }
        let snap = client.status();
        assert_eq!(snap.consecutive_failures, 3);
        assert!(!snap.db_connected);

        client.get("/events").await.unwrap();
        let snap = client.status();
        assert_eq!(snap.consecutive_failures, 0);
        assert!(!snap.db_connected, "only a health check restores the flag");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_then_replay() {
        let client = client(vec![
            status(503),
            status(503),
            status(503),
            reconnect(true),
            ok(r#"{"id":"1"}"#),
        ]);

        let response = client.post("/appointments", &serde_json::json!({"patientName": "A"})).await.unwrap();
        assert_eq!(response.text(), r#"{"id":"1"}"#);
        assert_eq!(
            transport(&client).paths(),
            vec![
                "/api/appointments",
                "/api/appointments",
                "/api/appointments",
                "/api/db-reconnect",
                "/api/appointments",
            ]
        );
        let snap = client.status();
        assert_eq!(snap.consecutive_failures, 0);
        assert!(snap.db_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_happens_only_once() {
        let client = client(vec![
            status(503),
            status(503),
            status(503),
            reconnect(true),
            status(503),
            status(503),
            status(503),
        ]);

        let err = client.get("/testimonials").await.unwrap_err();
        assert!(matches!(err, ApiError::ServiceUnavailable));
        let paths = transport(&client).paths();
        assert_eq!(paths.len(), 7);
        assert_eq!(paths.iter().filter(|p| p.ends_with("db-reconnect")).count(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_tears_down_session() {
        let client = client(vec![status(401), ok(r#"{"database":{"connected":true}}"#)]);
        client
            .session()
            .login(Credentials {
                token: "expired".into(),
                role: Role::Doctor,
            })
            .unwrap();
        client.session().navigate("/doctor/appointments");
        for _ in 0..6 {
            client.connection().record_failure();
        }

        let err = client.get("/appointments").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(client.session().credentials().is_none());
        assert_eq!(client.session().current_route(), "/doctor/login");
        assert_eq!(client.status().consecutive_failures, 6);

        // The degraded count also triggered a background probe.
        settle().await;
        assert_eq!(
            transport(&client).paths(),
            vec!["/api/appointments", "/api/health"]
        );
    }

    #[tokio::test]
    async fn test_background_probe_failure_is_swallowed() {
        let client = client(vec![
            ok("[]"),
            Err(TransportError::new(TransportErrorKind::ConnectionRefused, "down")),
        ]);
        for _ in 0..6 {
            client.connection().record_failure();
        }

        assert!(client.get("/blogs").await.is_ok());
        settle().await;
        assert_eq!(transport(&client).paths(), vec!["/api/blogs", "/api/health"]);
        assert_eq!(client.status().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_not_found_single_attempt() {
        let client = client(vec![Ok(ApiResponse::new(
            404,
            r#"{"message":"Doctor not found"}"#,
        ))]);
        client.connection().record_failure();

        let err = client.get("/doctors/99").await.unwrap_err();
        assert_eq!(err.to_string(), "Doctor not found");
        assert_eq!(transport(&client).requests().len(), 1);
        assert_eq!(client.status().consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_500_leaves_count_unchanged() {
        let client = client(vec![status(500), status(500), status(500)]);
        client.connection().record_failure();

        let err = client.get("/blogs").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(transport(&client).requests().len(), 3);
        assert_eq!(client.status().consecutive_failures, 1);
        assert!(client.status().db_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_marks_offline() {
        let refused = || Err(TransportError::new(TransportErrorKind::ConnectionRefused, "refused"));
        let client = client(vec![refused(), refused(), refused()]);

        let err = client.delete("/blogs/1").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(transport(&client).requests().len(), 3);
        let snap = client.status();
        assert!(!snap.is_online);
        assert_eq!(snap.consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_online() {
        let timeout = || Err(TransportError::new(TransportErrorKind::TimedOut, "deadline"));
        let client = client(vec![timeout(), timeout(), timeout()]);

        let err = client.put("/events/3", &serde_json::json!({"title": "Open day"})).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
        assert!(client.status().is_online);
    }
}
