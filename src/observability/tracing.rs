//! Request spans.
//!
//! Every logical call runs inside an `api_request` span carrying the method,
//! URL and request ID, so retry and classification events correlate.

use tracing::Span;

use crate::http::ApiRequest;

pub fn request_span(request: &ApiRequest) -> Span {
    tracing::info_span!(
        "api_request",
        method = %request.method,
        url = %request.url,
        request_id = request.request_id().unwrap_or("unknown"),
    )
}
