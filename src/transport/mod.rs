//! HTTP transport seam
//!
//! Services never talk to an HTTP library directly. They build an [`HttpRequest`]
//! and hand it to an [`HttpTransport`], which makes tests and alternative stacks a
//! matter of swapping one trait object.
//!
//! A transport answers `Ok` for every response that arrived, whatever its status
//! code. `Err` is reserved for requests that produced no response at all.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};

pub mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

/// Transport-level failures (no HTTP response was received)
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be constructed
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including query string
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Request with no headers and no body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a header
    ///
    /// # Errors
    /// [`TransportError::InvalidRequest`] when the name or value is not valid HTTP
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, TransportError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header name '{name}'")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidRequest(format!("invalid value for header '{name}'")))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Attach a body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Response of any status
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Response headers (lookups are case-insensitive)
    pub headers: HeaderMap,
    /// Raw body
    pub body: Bytes,
}

impl HttpResponse {
    /// Response with `status` and `body`
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(HeaderName::from_static(name), value);
        }
        self
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends HTTP requests on behalf of the services
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return whatever response arrived
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
