//! Outgoing request representation and the request interceptor.
//!
//! # Responsibilities
//! - Describe a call independently of the transport (so it can be replayed)
//! - Attach the bearer token, a request ID and a start timestamp
//!
//! # Design Decisions
//! - Request ID is generated once per logical call and reused across retries
//! - Headers are overwritten, not appended, so replays stay idempotent

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use url::Url;

use crate::auth::Credentials;

/// Header carrying the per-call correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header carrying the unix-millis time the call was first issued.
pub const X_REQUEST_START: &str = "x-request-start";

/// A file sent as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct Multipart {
    /// Form field name for the file part.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    /// Additional plain text fields.
    pub fields: Vec<(String, String)>,
}

impl Multipart {
    pub fn file(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
            fields: Vec::new(),
        }
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Multipart),
}

/// A fully described outbound call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url, body: RequestBody, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        if matches!(body, RequestBody::Json(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Self {
            method,
            url,
            headers,
            body,
            timeout,
        }
    }

    /// The request ID attached by [`intercept`], if any.
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
    }
}

/// Request interceptor: attach credentials and correlation headers.
pub fn intercept(request: &mut ApiRequest, credentials: Option<&Credentials>, request_id: &str) {
    let headers = &mut request.headers;

    match credentials.and_then(|c| HeaderValue::from_str(&format!("Bearer {}", c.token)).ok()) {
        Some(value) => {
            headers.insert(AUTHORIZATION, value);
        }
        None => {
            headers.remove(AUTHORIZATION);
        }
    }

    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(HeaderName::from_static(X_REQUEST_ID), value);
    }

    let started_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    headers.insert(
        HeaderName::from_static(X_REQUEST_START),
        HeaderValue::from(started_ms as u64),
    );
}
