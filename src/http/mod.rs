//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (ApiClient::get/post/put/delete/upload)
//!     → request.rs (interceptor: bearer token, request ID, start timestamp)
//!     → resilience::retries (attempt loop)
//!         → transport.rs (one HTTP exchange)
//!         → response.rs (interceptor: latency logging)
//!     → resilience::classifier (on final failure)
//!     → health::passive / auth::Session (apply effects)
//!     → caller
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

pub use client::{endpoint, select_base_url, ApiClient, ClientBuildError};
pub use error::{ApiError, ApiResult, TransportError, TransportErrorKind};
pub use request::{ApiRequest, Multipart, RequestBody, X_REQUEST_ID, X_REQUEST_START};
pub use response::ApiResponse;
pub use transport::{ReqwestTransport, Transport};
