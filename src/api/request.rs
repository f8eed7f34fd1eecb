//! Request and response values exchanged with the transport.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap};
use url::Url;

use super::error::ApiError;
use super::page::Page;

/// A GET request against the API.
///
/// Built once and never mutated: the executor re-sends the identical value
/// after a rate-limit wait.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    url: String,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
}

impl ApiRequest {
    /// Creates a GET request for `url` with no parameters or headers.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Adds a query parameter, replacing an earlier value with the same name.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(name.into(), value.to_string());
        self
    }

    /// Adds every pair of `params` as query parameters.
    #[must_use]
    pub fn with_query_params<'a, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, value) in params {
            self.query.insert(name.clone(), value.clone());
        }
        self
    }

    /// Adds the given headers.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.into());
        }
        self
    }

    /// Endpoint URL without query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query parameters, sorted by name.
    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// The endpoint URL with the query parameters appended.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the endpoint URL does not parse.
    pub fn full_url(&self) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url).map_err(|_| ApiError::invalid_url(&self.url))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("ApiRequest")
            .field("method", &"GET")
            .field("url", &self.url)
            .field("query", &self.query)
            .field("headers", &headers)
            .finish()
    }
}

/// A response as returned by the transport.
///
/// Header lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as a [`Page`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not a JSON array or object.
    pub fn decode_page(&self, url: &str) -> Result<Page, ApiError> {
        Page::from_slice(url, &self.body)
    }
}
