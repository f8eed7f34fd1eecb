//! Aggregation of paginated listings.
//!
//! Pages are fetched strictly one after another: whether page `i + 1`
//! exists is unknown until page `i` has been examined. Collection stops at
//! the first empty page, at the first API error payload, or after
//! `max_pages` pages. The policy cannot tell "no more pages" from "limit
//! reached"; callers wanting everything pass a large enough limit.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::client::{GitHubClient, PageParams};
use super::constants::COMMITS_PAGE_SIZE;
use super::error::ApiError;
use super::page::Page;

/// Why collection stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// Page `page` held no items; it is not part of the result.
    EmptyPage {
        /// 1-indexed page number.
        page: u32,
    },
    /// Page `page` was the API's error payload; it is not part of the result.
    ApiError {
        /// 1-indexed page number.
        page: u32,
        /// `message` of the error payload.
        message: String,
    },
    /// Every page up to the limit held items.
    MaxPages,
}

/// Items of every collected page, in page order then in-page order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    /// Concatenated items; never re-sorted.
    pub items: Vec<Value>,
    /// Requests that returned a page (including the one that stopped collection).
    pub pages_fetched: u32,
    /// Why collection ended.
    pub stop_reason: StopReason,
}

impl AggregatedResult {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            pages_fetched: 0,
            stop_reason: StopReason::MaxPages,
        }
    }

    /// Number of collected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Drives `fetch` over pages `1..=max_pages` and concatenates the items.
///
/// Stop rules, checked in order for each page:
///
/// 1. an empty page stops collection and is dropped
/// 2. an API error payload (or a 404 whose body has that shape) is logged,
///    stops collection and is dropped
/// 3. a listing has its items appended
///
/// `label` only appears in logs.
///
/// # Errors
///
/// Propagates every error of `fetch` except the not-found 404 above, and
/// returns [`ApiError::PayloadShape`] for a page that is neither a listing
/// nor an error payload.
pub async fn collect_pages<F, Fut>(
    label: &str,
    max_pages: u32,
    mut fetch: F,
) -> Result<AggregatedResult, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page, ApiError>>,
{
    let mut result = AggregatedResult::empty();

    for page_number in 1..=max_pages {
        let page = match fetch(page_number).await {
            Ok(page) => page,
            Err(e) if e.is_not_found() => {
                let message = e
                    .api_error_body()
                    .map(|body| body.message)
                    .unwrap_or_default();
                warn!(label, page = page_number, %message, "not found, stopping pagination");
                result.pages_fetched = page_number;
                result.stop_reason = StopReason::ApiError {
                    page: page_number,
                    message,
                };
                return Ok(result);
            }
            Err(e) => return Err(e),
        };
        result.pages_fetched = page_number;

        if page.is_empty() {
            debug!(label, page = page_number, "empty page, stopping pagination");
            result.stop_reason = StopReason::EmptyPage { page: page_number };
            return Ok(result);
        }

        match page {
            Page::Items(items) => {
                debug!(label, page = page_number, count = items.len(), "page collected");
                result.items.extend(items);
            }
            Page::ApiError(error) => {
                warn!(
                    label,
                    page = page_number,
                    message = %error.message,
                    documentation_url = %error.documentation_url,
                    "API error payload, stopping pagination"
                );
                result.stop_reason = StopReason::ApiError {
                    page: page_number,
                    message: error.message,
                };
                return Ok(result);
            }
            Page::Object(_) => {
                return Err(ApiError::payload_shape(
                    label,
                    format!("page {page_number} is an object, expected a listing"),
                ));
            }
        }
    }

    result.stop_reason = StopReason::MaxPages;
    Ok(result)
}

impl GitHubClient {
    /// Collects up to `max_pages` pages of 100 commits each.
    ///
    /// `max_pages == 0` returns an empty result without sending anything.
    ///
    /// # Errors
    ///
    /// See [`collect_pages`].
    #[instrument(skip(self))]
    pub async fn collect_all_pages(
        &self,
        owner: &str,
        repo: &str,
        max_pages: u32,
    ) -> Result<AggregatedResult, ApiError> {
        let result = collect_pages("list_commits", max_pages, move |page| {
            self.list_commits(owner, repo, PageParams::new(COMMITS_PAGE_SIZE, page))
        })
        .await?;
        info!(
            owner,
            repo,
            items = result.len(),
            pages = result.pages_fetched,
            stop_reason = ?result.stop_reason,
            "commit collection finished"
        );
        Ok(result)
    }
}
