//! CLI command handlers.

mod commits;
mod contents;
mod search;
mod token;

use std::path::Path;

use anyhow::{Context, Result};
use ghfetch_core::{JsonFileSink, persist};
use serde::Serialize;
use tracing::debug;

pub use commits::{run_all_commits_command, run_commits_command};
pub use contents::run_contents_command;
pub use search::run_search_command;
pub use token::resolve_credentials;

/// Where command results go: JSON files, or stdout with `--no-save`.
#[derive(Debug)]
pub struct Output {
    sink: Option<JsonFileSink>,
}

impl Output {
    pub fn new(output_dir: &Path, no_save: bool) -> Self {
        let sink = (!no_save).then(|| JsonFileSink::new(output_dir));
        Self { sink }
    }

    /// Saves `value` as `name`, or prints it. A failed save is logged only.
    pub fn emit<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        match &self.sink {
            Some(sink) => {
                persist(sink, name, value);
            }
            None => {
                debug!(name, "printing result instead of saving");
                let rendered =
                    serde_json::to_string_pretty(value).context("failed to render result")?;
                println!("{rendered}");
            }
        }
        Ok(())
    }
}
