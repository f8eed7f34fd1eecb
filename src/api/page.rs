//! Decoded API payloads.
//!
//! A [`Page`] is one decoded JSON body. Decoding is a tagged-variant match:
//! a JSON array is a successful listing, an object carrying both `message`
//! and `documentation_url` is the API's error shape, and any other object is
//! a single resource (a file, a search wrapper).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ApiError;

/// The message GitHub puts in error payloads for absent resources.
const NOT_FOUND_MESSAGE: &str = "Not Found";

/// One decoded API payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Page {
    /// A listing (commits, directory entries).
    Items(Vec<Value>),
    /// API-level error payload, possibly delivered with a 2xx status.
    ApiError(ApiErrorBody),
    /// A single object (search wrapper, file).
    Object(Map<String, Value>),
}

/// The API's error payload: `{"message": ..., "documentation_url": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human readable error, e.g. `"Not Found"`.
    pub message: String,
    /// Link to the endpoint documentation.
    pub documentation_url: String,
    /// Status echoed in the body by newer API versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Search endpoint wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total matches reported by the server (not the page size).
    #[serde(default)]
    pub total_count: u64,
    /// Whether the server timed out before finding every match.
    #[serde(default)]
    pub incomplete_results: bool,
    /// Items on this page, in relevance order.
    pub items: Vec<Value>,
}

impl Page {
    /// Decodes a response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not JSON, or is a JSON
    /// scalar rather than an array or object.
    pub fn from_slice(url: &str, body: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(body).map_err(|source| ApiError::decode(url, source))
    }

    /// Whether the page holds nothing: an empty listing or an empty object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Items(items) => items.is_empty(),
            Self::Object(map) => map.is_empty(),
            Self::ApiError(_) => false,
        }
    }

    /// Items of a listing page.
    #[must_use]
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }

    /// The error payload, when the page is one.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::ApiError(error) => Some(error),
            _ => None,
        }
    }

    /// Whether the page is the API's "Not Found" payload.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.api_error()
            .is_some_and(|error| error.message == NOT_FOUND_MESSAGE)
    }

    /// Interprets the page as a search response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PayloadShape`] if the page is not an object with
    /// an `items` array.
    pub fn search_results(&self) -> Result<SearchResults, ApiError> {
        match self {
            Self::Object(map) => serde_json::from_value(Value::Object(map.clone()))
                .map_err(|e| ApiError::payload_shape("search_repositories", e.to_string())),
            Self::Items(_) => Err(ApiError::payload_shape(
                "search_repositories",
                "expected an object with `items`, got an array",
            )),
            Self::ApiError(error) => Err(ApiError::payload_shape(
                "search_repositories",
                format!("API error payload: {}", error.message),
            )),
        }
    }
}
