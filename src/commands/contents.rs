//! Contents command handler: a file object or a directory listing.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use ghfetch_core::GitHubClient;
use ghfetch_core::api::Page;
use ghfetch_core::sink::contents_file_name;
use tracing::{info, warn};

use super::Output;
use crate::cli::ContentsArgs;

pub async fn run_contents_command(
    client: &GitHubClient,
    output: &Output,
    args: &ContentsArgs,
) -> Result<()> {
    let target = &args.repository;
    let params: BTreeMap<String, String> = args.params.iter().cloned().collect();
    let extra = (!params.is_empty()).then_some(&params);

    let page = match client
        .get_contents(&target.owner, &target.repo, &args.path, extra)
        .await
    {
        Ok(page) => page,
        Err(e) if e.is_not_found() => {
            warn!(repository = %target, path = %args.path, "path not found");
            return Ok(());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("getting contents of {target}:{} failed", args.path));
        }
    };

    match &page {
        Page::ApiError(body) => {
            warn!(
                repository = %target,
                path = %args.path,
                message = %body.message,
                "API returned an error payload"
            );
            return Ok(());
        }
        Page::Items(entries) => {
            info!(repository = %target, path = %args.path, entries = entries.len(), "directory listed");
        }
        Page::Object(object) => {
            let kind = object.get("type").and_then(|t| t.as_str()).unwrap_or("object");
            info!(repository = %target, path = %args.path, kind, "contents fetched");
        }
    }

    output.emit(
        &contents_file_name(&target.owner, &target.repo, &args.path),
        &page,
    )
}
