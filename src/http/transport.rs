//! Transport seam between the client and the wire.
//!
//! # Responsibilities
//! - Send one `ApiRequest` and return the raw response
//! - Map connection-level failures to a `TransportErrorKind`
//!
//! # Design Decisions
//! - One attempt per call; retries live in `resilience`
//! - Non-2xx statuses are responses, not transport errors

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;

use crate::http::error::{TransportError, TransportErrorKind};
use crate::http::request::{ApiRequest, Multipart, RequestBody};
use crate::http::response::ApiResponse;

/// Sends a single request.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("hospital-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::from)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout);

        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(multipart) => builder.multipart(to_form(multipart)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_form(multipart: &Multipart) -> Result<reqwest::multipart::Form, TransportError> {
    let part = reqwest::multipart::Part::bytes(multipart.data.clone())
        .file_name(multipart.file_name.clone())
        .mime_str(&multipart.content_type)?;

    let form = multipart
        .fields
        .iter()
        .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        });

    Ok(form.part(multipart.field.clone(), part))
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::TimedOut
        } else {
            kind_from_chain(&err).unwrap_or(if err.is_connect() {
                TransportErrorKind::ConnectionRefused
            } else {
                TransportErrorKind::Other
            })
        };
        TransportError::new(kind, err.to_string())
    }
}

/// Walk the source chain looking for something more specific than reqwest's flags.
fn kind_from_chain(err: &(dyn StdError + 'static)) -> Option<TransportErrorKind> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            use std::io::ErrorKind;
            match io.kind() {
                ErrorKind::ConnectionRefused => return Some(TransportErrorKind::ConnectionRefused),
                ErrorKind::ConnectionAborted
                | ErrorKind::ConnectionReset
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof => return Some(TransportErrorKind::ConnectionAborted),
                ErrorKind::TimedOut => return Some(TransportErrorKind::TimedOut),
                _ => {}
            }
        }

        let text = e.to_string().to_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return Some(TransportErrorKind::HostNotFound);
        }
        if text.contains("unreachable") {
            return Some(TransportErrorKind::NetworkUnreachable);
        }

        current = e.source();
    }
    None
}
