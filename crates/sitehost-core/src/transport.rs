//! HTTP transport for the API client
//!
//! The client composes an [`ApiRequest`] and hands it to a [`Transport`]; the
//! transport only moves bytes. Decoding and every judgement about the reply
//! happens in [`Response::from_http`](crate::Response::from_http).
//!
//! [`HttpTransport`] is the `reqwest` implementation. Tests and embedders can
//! supply their own implementation through
//! [`ClientBuilder::transport`](crate::ClientBuilder::transport).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, trace};

use crate::error::CoreError;

/// User agent string for outgoing requests
pub const USER_AGENT: &str = concat!("sitehost-core/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP verbs used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A fully composed request
///
/// `params` go into the query string for GET and into a form body for POST.
/// Order is kept, and repeated keys (`containers[]`) are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
}

/// Status and body of a reply, undecoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A request that did not produce a reply
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to encode request parameters: {0}")]
    Encode(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Sends requests to the API
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self, CoreError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CoreError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let builder = match request.method {
            Method::Get => {
                let url = query_url(&request.url, &request.params)?;
                self.client.get(url)
            }
            Method::Post => {
                let body = serde_urlencoded::to_string(&request.params)
                    .map_err(|e| TransportError::Encode(e.to_string()))?;
                self.client
                    .post(&request.url)
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(body)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?
            .to_vec();

        trace!(status, bytes = body.len(), "reply received");
        Ok(RawResponse { status, body })
    }
}

/// Append `params` to `base` as an encoded query string
fn query_url(base: &str, params: &[(String, String)]) -> Result<url::Url, TransportError> {
    let mut url = url::Url::parse(base).map_err(|e| TransportError::InvalidUrl {
        url: base.to_string(),
        message: e.to_string(),
    })?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}
