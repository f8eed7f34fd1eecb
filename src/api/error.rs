//! Error types for the api module.
//!
//! Every failure carries enough context (URL, operation, status, body) to be
//! diagnosed from a log line without reproducing the call. Rate-limit
//! exhaustion has no variant here: the executor absorbs it.

use thiserror::Error;

use super::constants::BODY_PREVIEW_CHARS;
use super::page::{ApiErrorBody, Page};

/// Errors that can occur while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    ///
    /// Never retried.
    #[error("transport error requesting {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-2xx response that is not rate-limit exhaustion.
    #[error("HTTP {status} from {url}: {}", body_preview(.body))]
    Http {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Response body as (lossy) UTF-8 text.
        body: String,
    },

    /// Response body is not JSON of any recognised page shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Decoded JSON does not have the shape the operation expects.
    #[error("unexpected payload for {operation}: {detail}")]
    PayloadShape {
        /// Operation that received the payload.
        operation: String,
        /// What was missing or wrong.
        detail: String,
    },

    /// A query argument was rejected before any request was sent.
    #[error("invalid argument for {operation}: {reason}")]
    InvalidArgument {
        /// Operation that rejected the argument.
        operation: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The configured base URL or a built endpoint URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client construction failed: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Creates a transport error from a reqwest error.
    ///
    /// Timeouts are reported as [`ApiError::Timeout`].
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates a payload shape error.
    pub fn payload_shape(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::PayloadShape {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the HTTP status for [`ApiError::Http`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decodes the body of an [`ApiError::Http`] as the API error shape
    /// (`{message, documentation_url}`), if it is one.
    #[must_use]
    pub fn api_error_body(&self) -> Option<ApiErrorBody> {
        let Self::Http { body, .. } = self else {
            return None;
        };
        match serde_json::from_str::<Page>(body) {
            Ok(Page::ApiError(error)) => Some(error),
            _ => None,
        }
    }

    /// Whether this is a 404 carrying the API's "Not Found" error payload.
    ///
    /// This is the "resource absent" boundary callers may treat as an
    /// expected outcome rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404) && self.api_error_body().is_some()
    }
}

/// Truncates a body for display, on a char boundary.
pub(crate) fn body_preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW_CHARS {
        return body.to_string();
    }
    let truncated: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    format!("{truncated}...")
}
