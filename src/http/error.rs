//! Error types for the HTTP client.
//!
//! `TransportError` means no response arrived at all. `ApiError` is what
//! callers see after retries and classification; its `Display` text is the
//! message meant for the person using the admin UI.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a call failed before any HTTP response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportErrorKind {
    /// The connection was dropped mid-flight.
    ConnectionAborted,
    /// The client-side deadline elapsed.
    TimedOut,
    /// DNS resolution failed.
    HostNotFound,
    /// Nothing is listening on the remote port.
    ConnectionRefused,
    /// No route to the remote network.
    NetworkUnreachable,
    /// Anything else (TLS, malformed request, body read failure).
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionAborted => "connection-aborted",
            Self::TimedOut => "timed-out",
            Self::HostNotFound => "host-not-found",
            Self::ConnectionRefused => "connection-refused",
            Self::NetworkUnreachable => "network-unreachable",
            Self::Other => "other",
        }
    }
}

/// A failure before any response was received.
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Error returned to callers of `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the credentials; the session has been torn down.
    #[error("Your session has expired. Please log in again.")]
    Unauthorized,

    /// HTTP 503, usually the backend losing its database.
    #[error("Service temporarily unavailable. Please try again in a few moments.")]
    ServiceUnavailable,

    /// HTTP 502 or 504 from an upstream gateway.
    #[error("Server is temporarily unavailable. Please try again later.")]
    ServerUnavailable { status: u16 },

    #[error("Request timed out. Please check your connection and try again.")]
    Timeout,

    #[error("Network error. Please check your internet connection.")]
    Network(#[source] TransportError),

    /// Any other error response, with the server's own message.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Unexpected response from server: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// HTTP status attached to this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::ServiceUnavailable => Some(503),
            Self::ServerUnavailable { status } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend reported its storage as unreachable.
    pub fn is_database_failure(&self) -> bool {
        matches!(self, Self::ServiceUnavailable)
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
