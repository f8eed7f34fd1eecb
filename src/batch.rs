//! Commit collection across several repositories at once.
//!
//! Each repository gets its own task and its own call chain through the
//! shared [`GitHubClient`]; nothing mutable is shared between chains. A
//! task that hits rate-limit exhaustion waits on its own while the others
//! keep going (or discover the exhaustion themselves).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::api::{AggregatedResult, ApiError, GitHubClient};

/// Default number of repositories collected at the same time.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Upper bound on concurrent repositories.
pub const MAX_BATCH_CONCURRENCY: usize = 32;

/// Errors for a single repository in a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The API call chain failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The task running the chain panicked or was cancelled.
    #[error("collection task for {target} did not complete: {reason}")]
    Task {
        /// Repository the task was collecting.
        target: String,
        /// Join failure description.
        reason: String,
    },
}

/// A repository named as `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoTarget {
    /// Account or organisation.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, repo) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("expected owner/repo, got '{s}'"))?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(format!("expected owner/repo, got '{s}'"));
        }
        Ok(Self::new(owner, repo))
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Outcome for one repository of a batch.
#[derive(Debug)]
pub struct RepoOutcome {
    /// Repository collected.
    pub target: RepoTarget,
    /// Its commits, or why they could not be collected.
    pub result: Result<AggregatedResult, BatchError>,
}

/// Collects up to `max_pages` commit pages of every target.
///
/// At most `concurrency` repositories (clamped to 1..=32) are in flight at
/// once. Outcomes are returned in input order; one repository failing
/// does not affect the others.
#[instrument(skip(client, targets), fields(targets = targets.len()))]
pub async fn collect_repositories(
    client: Arc<GitHubClient>,
    targets: Vec<RepoTarget>,
    max_pages: u32,
    concurrency: usize,
) -> Vec<RepoOutcome> {
    let concurrency = concurrency.clamp(1, MAX_BATCH_CONCURRENCY);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(targets.len());

    info!(concurrency, max_pages, "starting batch collection");

    for target in targets {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        let task_target = target.clone();

        let handle = tokio::spawn(async move {
            // Dropped when the task ends
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| BatchError::Task {
                    target: task_target.to_string(),
                    reason: e.to_string(),
                })?;
            debug!(target = %task_target, "collecting");
            client
                .collect_all_pages(&task_target.owner, &task_target.repo, max_pages)
                .await
                .map_err(BatchError::from)
        });
        handles.push((target, handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (target, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(target = %target, error = %e, "collection task panicked");
                Err(BatchError::Task {
                    target: target.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        if let Err(e) = &result {
            warn!(target = %target, error = %e, "repository collection failed");
        }
        outcomes.push(RepoOutcome { target, result });
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        completed = outcomes.len() - failed,
        failed, "batch collection complete"
    );
    outcomes
}
