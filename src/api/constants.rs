//! Constants for the api module (endpoints, headers, paging, timeouts).

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Media type requested on every call (REST API v3 JSON).
pub const ACCEPT_HEADER_VALUE: &str = "application/vnd.github.v3+json";

/// Default items per page for single-page queries.
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Default (first) page index. GitHub pages are 1-indexed.
pub const DEFAULT_PAGE: u32 = 1;

/// Largest `per_page` the API honours.
pub const MAX_PER_PAGE: u32 = 100;

/// Page size used when aggregating every commit of a repository.
pub const COMMITS_PAGE_SIZE: u32 = 100;

/// Default page limit for commit aggregation.
pub const DEFAULT_MAX_PAGES: u32 = 2;

/// Default HTTP connect timeout (10 seconds).
pub(crate) const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (30 seconds).
pub(crate) const READ_TIMEOUT_SECS: u64 = 30;

/// Characters of a response body kept in error messages and logs.
pub(crate) const BODY_PREVIEW_CHARS: usize = 200;
