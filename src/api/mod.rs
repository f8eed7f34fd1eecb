//! GitHub REST API access with transparent rate-limit handling.
//!
//! This module provides everything needed to query the GitHub API:
//! building requests, sending them over HTTP, waiting out rate-limit
//! exhaustion, decoding payloads and aggregating paginated listings.
//!
//! # Layers
//!
//! - [`Transport`] issues a single GET and returns status, headers and body
//! - [`RateLimitedExecutor`] wraps a transport; on `403` with
//!   `X-RateLimit-Remaining: 0` it sleeps until `X-RateLimit-Reset` and
//!   re-sends the identical request
//! - [`GitHubClient`] builds endpoint requests (search, commits, contents)
//!   and decodes the returned [`Page`]
//! - [`GitHubClient::collect_all_pages`] concatenates commit pages until an
//!   empty page, an API error payload, or the page limit
//!
//! # Example
//!
//! ```no_run
//! use ghfetch_core::api::{Credentials, GitHubClient, PageParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("ghp_example")?;
//! let client = GitHubClient::new(credentials)?;
//! let page = client
//!     .search_repositories("data science", PageParams::default())
//!     .await?;
//! println!("found {} items", page.search_results()?.items.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod clock;
mod constants;
mod credentials;
mod error;
mod executor;
mod page;
mod pagination;
pub mod rate_limit;
mod request;
mod transport;

pub use client::{ClientConfig, GitHubClient, PageParams};
pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::{
    ACCEPT_HEADER_VALUE, COMMITS_PAGE_SIZE, DEFAULT_API_BASE_URL, DEFAULT_MAX_PAGES,
    DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use credentials::{
    CredentialError, CredentialProvider, Credentials, EnvCredentialProvider,
    StaticCredentialProvider, TOKEN_ENV_VAR,
};
pub use error::ApiError;
pub use executor::{ExecutionState, RateLimitedExecutor};
pub use page::{ApiErrorBody, Page, SearchResults};
pub use pagination::{AggregatedResult, StopReason, collect_pages};
pub use rate_limit::RateLimitState;
pub use request::{ApiRequest, ApiResponse};
pub use transport::{HttpTransport, Transport};
