//! CLI entry point for the ghfetch tool.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ghfetch_core::{ClientConfig, GitHubClient};
use tracing::{debug, info};

mod cli;
mod commands;
mod logging;

use cli::{Args, Command};
use commands::Output;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    logging::init(args.verbose, args.quiet, args.log_file.as_deref())?;

    debug!(?args, "CLI arguments parsed");
    info!("ghfetch starting");

    let credentials = commands::resolve_credentials()?;

    let mut config = ClientConfig::with_base_url(&args.api_url)
        .with_context(|| format!("invalid --api-url '{}'", args.api_url))?;
    config.connect_timeout = Duration::from_secs(args.connect_timeout);
    config.read_timeout = Duration::from_secs(args.read_timeout);
    let client = Arc::new(GitHubClient::with_config(config, credentials)?);

    let output = Output::new(&args.output_dir, args.no_save);

    match &args.command {
        Command::Search(search) => commands::run_search_command(&client, &output, search).await?,
        Command::Commits(commits) => {
            commands::run_commits_command(&client, &output, commits).await?;
        }
        Command::AllCommits(all) => {
            commands::run_all_commits_command(Arc::clone(&client), &output, all).await?;
        }
        Command::Contents(contents) => {
            commands::run_contents_command(&client, &output, contents).await?;
        }
    }

    info!("ghfetch finished");
    Ok(())
}
