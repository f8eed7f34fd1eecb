//! Commit command handlers: a single page, or every page across repositories.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use ghfetch_core::api::{Page, PageParams, StopReason};
use ghfetch_core::sink::{all_commits_file_name, commits_file_name};
use ghfetch_core::{GitHubClient, collect_repositories};
use tracing::{error, info, warn};

use super::Output;
use crate::cli::{AllCommitsArgs, CommitsArgs};

pub async fn run_commits_command(
    client: &GitHubClient,
    output: &Output,
    args: &CommitsArgs,
) -> Result<()> {
    let target = &args.repository;
    let params = PageParams::new(args.pages.per_page, args.pages.page);
    let page = match client.list_commits(&target.owner, &target.repo, params).await {
        Ok(page) => page,
        Err(e) if e.is_not_found() => {
            warn!(repository = %target, "repository not found");
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("listing commits of {target} failed")),
    };

    match &page {
        Page::Items(commits) => {
            info!(repository = %target, commits = commits.len(), "commits listed");
            output.emit(&commits_file_name(&target.owner, &target.repo), &page)
        }
        Page::ApiError(body) => {
            warn!(repository = %target, message = %body.message, "API returned an error payload");
            Ok(())
        }
        Page::Object(_) => bail!("unexpected object listing commits of {target}"),
    }
}

pub async fn run_all_commits_command(
    client: Arc<GitHubClient>,
    output: &Output,
    args: &AllCommitsArgs,
) -> Result<()> {
    let total = args.repositories.len();
    let outcomes = collect_repositories(
        client,
        args.repositories.clone(),
        args.max_pages,
        usize::from(args.concurrency),
    )
    .await;

    let mut failed = 0;
    for outcome in outcomes {
        let target = outcome.target;
        match outcome.result {
            Ok(result) => {
                if let StopReason::ApiError { message, .. } = &result.stop_reason {
                    warn!(repository = %target, %message, "collection stopped on API error");
                    if result.is_empty() {
                        warn!(repository = %target, "no commits collected, nothing saved");
                        continue;
                    }
                }
                info!(
                    repository = %target,
                    commits = result.len(),
                    pages = result.pages_fetched,
                    "commits collected"
                );
                output.emit(
                    &all_commits_file_name(&target.owner, &target.repo),
                    &result.items,
                )?;
            }
            Err(e) => {
                error!(repository = %target, error = %e, "commit collection failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} repositories failed");
    }
    Ok(())
}
