//! Search command handler: one page of repository search results.

use anyhow::{Context, Result};
use ghfetch_core::GitHubClient;
use ghfetch_core::api::PageParams;
use ghfetch_core::sink::search_file_name;
use tracing::{info, warn};

use super::Output;
use crate::cli::SearchArgs;

pub async fn run_search_command(
    client: &GitHubClient,
    output: &Output,
    args: &SearchArgs,
) -> Result<()> {
    let params = PageParams::new(args.pages.per_page, args.pages.page);
    let page = client
        .search_repositories(&args.query, params)
        .await
        .with_context(|| format!("search for '{}' failed", args.query))?;
    let results = page.search_results()?;

    if results.items.is_empty() {
        warn!(query = %args.query, "search returned no repositories");
    } else {
        info!(
            query = %args.query,
            items = results.items.len(),
            total = results.total_count,
            "search complete"
        );
    }
    if results.incomplete_results {
        warn!(query = %args.query, "server reported incomplete results");
    }

    output.emit(&search_file_name(&args.query), &page)
}
