//! ghfetch Core Library
//!
//! This library provides the core functionality for the ghfetch tool, a
//! client for the GitHub REST API that absorbs rate limiting transparently,
//! aggregates paginated listings and persists results as JSON.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - Transport, rate-limit aware execution, resource queries, pagination
//! - [`batch`] - Independent concurrent aggregation across several repositories
//! - [`sink`] - Durable storage of results (JSON files)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod batch;
pub mod sink;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use api::{
    AggregatedResult, ApiError, ApiErrorBody, ApiRequest, ApiResponse, ClientConfig, Clock,
    CredentialError, CredentialProvider, Credentials, EnvCredentialProvider, ExecutionState,
    GitHubClient, HttpTransport, ManualClock, Page, PageParams, RateLimitState,
    RateLimitedExecutor, SearchResults, StaticCredentialProvider, StopReason, SystemClock,
    Transport,
};
pub use batch::{
    BatchError, DEFAULT_BATCH_CONCURRENCY, RepoOutcome, RepoTarget, collect_repositories,
};
pub use sink::{JsonFileSink, ResultSink, SinkError, persist};
