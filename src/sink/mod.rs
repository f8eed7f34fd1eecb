//! Durable storage of query results.
//!
//! A [`ResultSink`] takes a JSON value and a destination name. Failures are
//! reported, never fatal: [`persist`] logs them and lets the caller carry on
//! with whatever larger operation triggered the save.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Errors produced while saving results.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error creating the directory or writing the file.
    #[error("I/O error writing {path}: {source}")]
    Io {
        /// Destination that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Destination name is empty or contains a path separator.
    #[error("invalid destination name: '{0}'")]
    InvalidName(String),
}

impl SinkError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Destination for results.
pub trait ResultSink: Send + Sync {
    /// Stores `value` under `name`, replacing anything stored there before.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the value could not be stored.
    fn save(&self, name: &str, value: &Value) -> Result<(), SinkError>;
}

/// Writes each result to `<dir>/<name>` as JSON indented by four spaces.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory results are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path `name` is written to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl ResultSink for JsonFileSink {
    #[instrument(skip(self, value), fields(dir = %self.dir.display()))]
    fn save(&self, name: &str, value: &Value) -> Result<(), SinkError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(SinkError::InvalidName(name.to_string()));
        }
        fs::create_dir_all(&self.dir).map_err(|e| SinkError::io(&self.dir, e))?;

        let path = self.path_for(name);
        let file = fs::File::create(&path).map_err(|e| SinkError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut serializer)?;
        writer.flush().map_err(|e| SinkError::io(&path, e))?;

        debug!(path = %path.display(), "result written");
        Ok(())
    }
}

/// Serialises `value` and saves it under `name`.
///
/// Returns whether the save succeeded. Success is logged at info, failure
/// at error; neither is propagated.
pub fn persist<T: Serialize + ?Sized>(sink: &dyn ResultSink, name: &str, value: &T) -> bool {
    let outcome = serde_json::to_value(value)
        .map_err(SinkError::from)
        .and_then(|value| sink.save(name, &value));
    match outcome {
        Ok(()) => {
            info!(name, "data successfully saved");
            true
        }
        Err(e) => {
            error!(name, error = %e, "failed to save data");
            false
        }
    }
}

/// File name for a repository search, e.g. `data_science_repos.json`.
#[must_use]
pub fn search_file_name(query: &str) -> String {
    format!("{}_repos.json", sanitize(query))
}

/// File name for one page of commits.
#[must_use]
pub fn commits_file_name(owner: &str, repo: &str) -> String {
    format!("{}_{}_commits.json", sanitize(owner), sanitize(repo))
}

/// File name for aggregated commits.
#[must_use]
pub fn all_commits_file_name(owner: &str, repo: &str) -> String {
    format!("{}_{}_allCommits.json", sanitize(owner), sanitize(repo))
}

/// File name for a contents lookup; the repository root has no path part.
#[must_use]
pub fn contents_file_name(owner: &str, repo: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("{}_{}_contents.json", sanitize(owner), sanitize(repo))
    } else {
        format!(
            "{}_{}_{}_contents.json",
            sanitize(owner),
            sanitize(repo),
            sanitize(path)
        )
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
