//! Response representation and the response interceptor.
//!
//! # Responsibilities
//! - Hold the status, headers and body exactly as the transport returned them
//! - Decode JSON bodies on demand
//! - Log per-attempt latency, flagging slow calls

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::http::error::{ApiError, TransportError};
use crate::http::request::ApiRequest;
use crate::resilience::RequestAttempt;

/// A response as received from the backend.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(ApiError::Decode)
    }

    /// Body as lossy UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `message` (or `error`) field of a JSON error body, if present.
    pub fn server_message(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
            error: Option<String>,
        }

        serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.is_empty())
    }
}

/// Response interceptor: log the outcome of one attempt.
pub fn log_attempt(
    request: &ApiRequest,
    attempt: &RequestAttempt,
    elapsed: Duration,
    slow_after: Duration,
    outcome: &Result<ApiResponse, TransportError>,
) {
    let request_id = request.request_id().unwrap_or("unknown");
    let elapsed_ms = elapsed.as_millis() as u64;
    let call_elapsed_ms = attempt.call_elapsed().as_millis() as u64;
    let attempt = attempt.number;

    match outcome {
        Ok(response) => {
            if elapsed > slow_after {
                tracing::warn!(
                    request_id = %request_id,
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    attempt,
                    elapsed_ms,
                    call_elapsed_ms,
                    "Slow request"
                );
            } else {
                tracing::debug!(
                    request_id = %request_id,
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    attempt,
                    elapsed_ms,
                    call_elapsed_ms,
                    "Request completed"
                );
            }
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                method = %request.method,
                url = %request.url,
                kind = e.kind.as_str(),
                attempt,
                elapsed_ms,
                call_elapsed_ms,
                error = %e.message,
                "Request failed without response"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let resp = ApiResponse::new(400, r#"{"success":false,"message":"Title is required"}"#);
        assert_eq!(resp.server_message().as_deref(), Some("Title is required"));

        let resp = ApiResponse::new(500, r#"{"error":"boom"}"#);
        assert_eq!(resp.server_message().as_deref(), Some("boom"));

        let resp = ApiResponse::new(502, "<html>Bad Gateway</html>");
        assert!(resp.server_message().is_none());
    }

    #[test]
    fn test_json_decode() {
        #[derive(Deserialize)]
        struct Body {
            connected: bool,
        }
        let resp = ApiResponse::new(200, r#"{"connected":true}"#);
        assert!(resp.json::<Body>().unwrap().connected);
        assert!(matches!(
            ApiResponse::new(200, "nope").json::<Body>(),
            Err(ApiError::Decode(_))
        ));
    }
}
