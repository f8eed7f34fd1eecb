//! Single-exchange HTTP transport.
//!
//! A [`Transport`] issues exactly one GET and reports what came back. It has
//! no retry logic; rate-limit handling lives in the executor above it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument};

use super::error::ApiError;
use super::request::{ApiRequest, ApiResponse};

/// Sends one request and returns the raw response.
///
/// Implementations must not interpret status codes: any response the server
/// produced, including 4xx and 5xx, is returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues `request` once.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] or [`ApiError::Timeout`] when the
    /// exchange could not be completed.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport with the given timeouts and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(
        connect_timeout: Duration,
        read_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self, request), fields(url = %request.url()))]
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = request.full_url()?;
        let headers = build_header_map(request)?;

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::transport(request.url(), e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(request.url(), e))?;

        debug!(status, bytes = body.len(), "response received");
        Ok(ApiResponse::new(status, headers, body.to_vec()))
    }
}

/// Converts request headers, marking credentials as sensitive so they are
/// never printed by the HTTP stack.
fn build_header_map(request: &ApiRequest) -> Result<HeaderMap, ApiError> {
    let mut map = HeaderMap::with_capacity(request.headers().len());
    for (name, value) in request.headers() {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ApiError::invalid_argument("send", format!("invalid header name `{name}`"))
        })?;
        let mut value = HeaderValue::from_str(value).map_err(|_| {
            ApiError::invalid_argument("send", format!("invalid value for header `{name}`"))
        })?;
        if name == AUTHORIZATION {
            value.set_sensitive(true);
        }
        map.insert(name, value);
    }
    Ok(map)
}
