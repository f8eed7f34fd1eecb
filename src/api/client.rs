//! Endpoint-specific queries against the GitHub REST API.
//!
//! [`GitHubClient`] builds requests for the repository search, commit
//! listing and contents endpoints, sends them through the
//! [`RateLimitedExecutor`] and decodes the body into a [`Page`]. It never
//! interprets the payload: a 200 carrying `{"message": "Not Found", ...}`
//! is returned as [`Page::ApiError`] for the caller to judge.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_API_BASE_URL, DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE,
    READ_TIMEOUT_SECS,
};
use super::credentials::Credentials;
use super::error::ApiError;
use super::executor::RateLimitedExecutor;
use super::page::Page;
use super::request::ApiRequest;
use super::transport::HttpTransport;
use crate::user_agent;

/// Connection settings, fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.github.com`.
    pub api_base_url: Url,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub read_timeout: Duration,
    /// User-Agent header (required by GitHub).
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            user_agent: user_agent::default_api_user_agent(),
        }
    }
}

#[allow(clippy::expect_used)]
fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid")
}

impl ClientConfig {
    /// Same defaults with a different API root (GitHub Enterprise, test servers).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base` is not an absolute URL.
    pub fn with_base_url(base: &str) -> Result<Self, ApiError> {
        let api_base_url = Url::parse(base).map_err(|_| ApiError::invalid_url(base))?;
        Ok(Self {
            api_base_url,
            ..Self::default()
        })
    }

    /// Joins segments onto the API root, percent-encoding each one as a
    /// single segment (`/` inside a segment becomes `%2F`).
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> String {
        let mut url = self.api_base_url.as_str().trim_end_matches('/').to_string();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }
}

/// Splits a repository path into its segments.
///
/// Empty pieces (leading, trailing or doubled slashes) are dropped. `.` and
/// `..` are rejected: URL normalization would resolve them against the
/// endpoint and address a different resource.
fn path_segments<'a>(operation: &str, path: &'a str) -> Result<Vec<&'a str>, ApiError> {
    let segments: Vec<&str> = path.split('/').filter(|piece| !piece.is_empty()).collect();
    if let Some(dots) = segments.iter().find(|piece| is_dot_segment(piece)) {
        return Err(ApiError::invalid_argument(
            operation,
            format!("path must not contain `{dots}` segments"),
        ));
    }
    Ok(segments)
}

fn is_dot_segment(piece: &str) -> bool {
    matches!(piece, "." | "..")
}

/// `per_page` / `page` pair for single-page queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// Items per page (1..=100).
    pub per_page: u32,
    /// 1-indexed page number.
    pub page: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            page: DEFAULT_PAGE,
        }
    }
}

impl PageParams {
    /// Creates page parameters.
    #[must_use]
    pub fn new(per_page: u32, page: u32) -> Self {
        Self { per_page, page }
    }

    fn validate(self, operation: &str) -> Result<Self, ApiError> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(ApiError::invalid_argument(
                operation,
                format!("per_page must be 1..={MAX_PER_PAGE}, got {}", self.per_page),
            ));
        }
        if self.page == 0 {
            return Err(ApiError::invalid_argument(
                operation,
                "page is 1-indexed, got 0",
            ));
        }
        Ok(self)
    }
}

/// Client for the search, commits and contents endpoints.
///
/// Cheap to share behind an `Arc`: it holds only read-only configuration
/// and a stateless executor.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: Arc<ClientConfig>,
    credentials: Credentials,
    executor: RateLimitedExecutor,
}

impl GitHubClient {
    /// Creates a client for `api.github.com` over HTTP with the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::default(), credentials)
    }

    /// Creates a client over HTTP with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(
            config.connect_timeout,
            config.read_timeout,
            &config.user_agent,
        )?;
        let executor = RateLimitedExecutor::new(Arc::new(transport));
        Ok(Self::from_parts(config, credentials, executor))
    }

    /// Assembles a client from an existing executor (custom transport or clock).
    #[must_use]
    pub fn from_parts(
        config: ClientConfig,
        credentials: Credentials,
        executor: RateLimitedExecutor,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credentials,
            executor,
        }
    }

    /// Settings this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, url: String) -> ApiRequest {
        ApiRequest::get(url).with_headers(self.credentials.headers())
    }

    /// Builds the repository search request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an empty query or
    /// out-of-range page parameters.
    pub fn search_request(&self, query: &str, params: PageParams) -> Result<ApiRequest, ApiError> {
        let params = params.validate("search_repositories")?;
        if query.trim().is_empty() {
            return Err(ApiError::invalid_argument(
                "search_repositories",
                "query must not be empty",
            ));
        }
        Ok(self
            .request(self.config.endpoint(["search", "repositories"]))
            .with_query("q", query)
            .with_query("per_page", params.per_page)
            .with_query("page", params.page))
    }

    /// Searches public repositories.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for invalid arguments, transport failures,
    /// non-2xx responses and undecodable bodies.
    #[instrument(skip(self))]
    pub async fn search_repositories(
        &self,
        query: &str,
        params: PageParams,
    ) -> Result<Page, ApiError> {
        info!(
            query,
            page = params.page,
            per_page = params.per_page,
            "searching repositories"
        );
        let request = self.search_request(query, params)?;
        self.fetch_page(&request).await
    }

    /// Builds the commit listing request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an invalid owner or repo or
    /// out-of-range page parameters.
    pub fn commits_request(
        &self,
        owner: &str,
        repo: &str,
        params: PageParams,
    ) -> Result<ApiRequest, ApiError> {
        let params = params.validate("list_commits")?;
        require_repo("list_commits", owner, repo)?;
        Ok(self
            .request(self.config.endpoint(["repos", owner, repo, "commits"]))
            .with_query("per_page", params.per_page)
            .with_query("page", params.page))
    }

    /// Lists commits of a repository, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for invalid arguments, transport failures,
    /// non-2xx responses and undecodable bodies.
    #[instrument(skip(self))]
    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        params: PageParams,
    ) -> Result<Page, ApiError> {
        info!(
            owner,
            repo,
            page = params.page,
            per_page = params.per_page,
            "listing commits"
        );
        let request = self.commits_request(owner, repo, params)?;
        self.fetch_page(&request).await
    }

    /// Builds the contents request. `path` may be empty (repository root)
    /// and may contain `/`; every segment is percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an invalid owner or repo,
    /// or a path containing `.` or `..` segments.
    pub fn contents_request(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        extra_params: Option<&BTreeMap<String, String>>,
    ) -> Result<ApiRequest, ApiError> {
        require_repo("get_contents", owner, repo)?;
        let path = path_segments("get_contents", path)?;
        let request = self.request(
            self.config
                .endpoint(["repos", owner, repo, "contents"].into_iter().chain(path)),
        );
        Ok(match extra_params {
            Some(params) => request.with_query_params(params),
            None => request,
        })
    }

    /// Fetches a file (object) or directory listing (array).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for invalid arguments, transport failures,
    /// non-2xx responses and undecodable bodies.
    #[instrument(skip(self))]
    pub async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        extra_params: Option<&BTreeMap<String, String>>,
    ) -> Result<Page, ApiError> {
        info!(owner, repo, path, "getting contents");
        let request = self.contents_request(owner, repo, path, extra_params)?;
        self.fetch_page(&request).await
    }

    async fn fetch_page(&self, request: &ApiRequest) -> Result<Page, ApiError> {
        let response = self.executor.execute(request).await?;
        let page = response.decode_page(request.url())?;
        debug!(url = %request.url(), empty = page.is_empty(), "page decoded");
        Ok(page)
    }
}

/// Owner and repo must each name exactly one path segment.
fn require_repo(operation: &str, owner: &str, repo: &str) -> Result<(), ApiError> {
    for (field, value) in [("owner", owner), ("repo", repo)] {
        if value.trim().is_empty() {
            return Err(ApiError::invalid_argument(
                operation,
                format!("{field} must not be empty"),
            ));
        }
        if value.contains('/') || is_dot_segment(value) {
            return Err(ApiError::invalid_argument(
                operation,
                format!("{field} `{value}` is not a single path segment"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::HeaderMap;
    use serde_json::json;

    use super::*;
    use crate::api::clock::ManualClock;
    use crate::api::request::ApiResponse;
    use crate::test_support::{ScriptedTransport, json_response};

    fn client_with(transport: &Arc<ScriptedTransport>) -> GitHubClient {
        let executor = RateLimitedExecutor::with_clock(
            transport.clone(),
            Arc::new(ManualClock::at_epoch_secs(0)),
        );
        GitHubClient::from_parts(
            ClientConfig::default(),
            Credentials::new("ghp_test").unwrap(),
            executor,
        )
    }

    fn client() -> GitHubClient {
        client_with(&Arc::new(ScriptedTransport::default()))
    }

    // ==================== Request Construction Tests ====================

    #[test]
    fn test_search_request_parameters_are_stable() {
        let client = client();
        let first = client
            .search_request("data science", PageParams::new(5, 1))
            .unwrap();
        let second = client
            .search_request("data science", PageParams::new(5, 1))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.url(), "https://api.github.com/search/repositories");
        let expected: BTreeMap<String, String> = [
            ("q".to_string(), "data science".to_string()),
            ("per_page".to_string(), "5".to_string()),
            ("page".to_string(), "1".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(first.query(), &expected);
    }

    #[test]
    fn test_requests_carry_credential_headers() {
        let request = client()
            .search_request("rust", PageParams::default())
            .unwrap();
        assert_eq!(request.headers()["authorization"], "token ghp_test");
        assert_eq!(
            request.headers()["accept"],
            "application/vnd.github.v3+json"
        );
    }

    #[test]
    fn test_page_params_default_is_five_on_first_page() {
        assert_eq!(PageParams::default(), PageParams::new(5, 1));
    }

    #[test]
    fn test_search_request_rejects_empty_query() {
        let result = client().search_request("  ", PageParams::default());
        assert!(matches!(result, Err(ApiError::InvalidArgument { .. })));
    }

    #[test]
    fn test_page_params_reject_out_of_range() {
        let client = client();
        assert!(client
            .search_request("q", PageParams::new(0, 1))
            .is_err());
        assert!(client
            .search_request("q", PageParams::new(101, 1))
            .is_err());
        assert!(client
            .search_request("q", PageParams::new(100, 0))
            .is_err());
        assert!(client
            .search_request("q", PageParams::new(100, 1))
            .is_ok());
    }

    #[test]
    fn test_commits_request_url_and_params() {
        let request = client()
            .commits_request("octocat", "Spoon-Knife", PageParams::new(100, 3))
            .unwrap();
        assert_eq!(
            request.url(),
            "https://api.github.com/repos/octocat/Spoon-Knife/commits"
        );
        assert_eq!(request.query()["per_page"], "100");
        assert_eq!(request.query()["page"], "3");
        assert!(!request.query().contains_key("q"));
    }

    #[test]
    fn test_commits_request_rejects_empty_owner_or_repo() {
        let client = client();
        assert!(client
            .commits_request("", "repo", PageParams::default())
            .is_err());
        assert!(client
            .commits_request("owner", " ", PageParams::default())
            .is_err());
    }

    #[test]
    fn test_contents_request_root_path() {
        let request = client()
            .contents_request("samambea", "cssBasics", "", None)
            .unwrap();
        assert_eq!(
            request.url(),
            "https://api.github.com/repos/samambea/cssBasics/contents"
        );
        assert!(request.query().is_empty());
    }

    #[test]
    fn test_contents_request_keeps_path_separators() {
        let request = client()
            .contents_request("samambea", "cssBasics", "projWeb/css", None)
            .unwrap();
        assert_eq!(
            request.url(),
            "https://api.github.com/repos/samambea/cssBasics/contents/projWeb/css"
        );
    }

    #[test]
    fn test_contents_request_percent_encodes_segments() {
        let request = client()
            .contents_request("o", "r", "/my docs/notes #1?.md/", None)
            .unwrap();
        assert_eq!(
            request.url(),
            "https://api.github.com/repos/o/r/contents/my%20docs/notes%20%231%3F.md"
        );
    }

    #[test]
    fn test_contents_request_rejects_dot_segments() {
        let client = client();
        for path in ["../../../user", "docs/../../x", "./README.md", "a/.."] {
            let result = client.contents_request("o", "r", path, None);
            assert!(
                matches!(result, Err(ApiError::InvalidArgument { .. })),
                "path {path:?} should be rejected, got: {result:?}"
            );
        }
    }

    #[test]
    fn test_contents_request_allows_dots_inside_names() {
        let request = client()
            .contents_request("o", "r", ".github/...hidden/v1.2", None)
            .unwrap();
        assert_eq!(
            request.url(),
            "https://api.github.com/repos/o/r/contents/.github/...hidden/v1.2"
        );
    }

    #[test]
    fn test_requests_reject_owner_or_repo_spanning_segments() {
        let client = client();
        assert!(matches!(
            client.commits_request("octocat/Spoon-Knife", "x", PageParams::default()),
            Err(ApiError::InvalidArgument { .. })
        ));
        assert!(matches!(
            client.commits_request("octocat", "a/b", PageParams::default()),
            Err(ApiError::InvalidArgument { .. })
        ));
        assert!(matches!(
            client.contents_request("..", "r", "", None),
            Err(ApiError::InvalidArgument { .. })
        ));
        assert!(matches!(
            client.contents_request("o", ".", "", None),
            Err(ApiError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_endpoint_encodes_slash_inside_segment() {
        let config = ClientConfig::default();
        assert_eq!(
            config.endpoint(["repos", "a/b", "c"]),
            "https://api.github.com/repos/a%2Fb/c"
        );
    }

    #[test]
    fn test_contents_request_extra_params() {
        let params: BTreeMap<String, String> =
            [("ref".to_string(), "main".to_string())].into_iter().collect();
        let request = client()
            .contents_request("o", "r", "README.md", Some(&params))
            .unwrap();
        assert_eq!(request.query()["ref"], "main");
    }

    #[test]
    fn test_config_with_base_url_trailing_slash() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:9999/api/v3/").unwrap();
        assert_eq!(
            config.endpoint(["search", "repositories"]),
            "http://127.0.0.1:9999/api/v3/search/repositories"
        );
    }

    #[test]
    fn test_config_with_base_url_rejects_relative() {
        assert!(matches!(
            ClientConfig::with_base_url("api.github.com"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    // ==================== Query Execution Tests ====================

    #[tokio::test]
    async fn test_search_repositories_returns_decoded_page() {
        let transport = Arc::new(ScriptedTransport::from_responses([json_response(&json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": [{"id": 1, "full_name": "a/b"}]
        }))]));
        let client = client_with(&transport);

        let page = client
            .search_repositories("data science", PageParams::default())
            .await
            .unwrap();

        let results = page.search_results().unwrap();
        assert_eq!(results.items.len(), 1);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_list_commits_returns_error_payload_as_page() {
        let transport = Arc::new(ScriptedTransport::from_responses([json_response(&json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        }))]));
        let client = client_with(&transport);

        let page = client
            .list_commits("nonexistentuser12345", "nonexistentrepo67890", PageParams::default())
            .await
            .unwrap();

        assert!(page.is_not_found());
    }

    #[tokio::test]
    async fn test_get_contents_404_surfaces_http_error() {
        let transport = Arc::new(ScriptedTransport::from_responses([ApiResponse::new(
            404,
            HeaderMap::new(),
            r#"{"message":"Not Found","documentation_url":"https://docs.github.com/rest"}"#,
        )]));
        let client = client_with(&transport);

        let result = client
            .get_contents("samambea", "cssBasics", "thisfiledoesn'texist", None)
            .await;

        match result {
            Err(e) => assert!(e.is_not_found(), "Expected not-found, got: {e}"),
            Ok(page) => panic!("Expected error, got: {page:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_arguments_send_nothing() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client_with(&transport);

        let result = client.list_commits("", "repo", PageParams::default()).await;

        assert!(result.is_err());
        assert_eq!(transport.request_count(), 0);
    }
}
