//! Shared User-Agent string for API requests.
//!
//! GitHub rejects requests without a User-Agent, so every client built by
//! this crate identifies itself with the crate name, version and project URL.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/ghfetch";

/// Default User-Agent for API requests.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("ghfetch/{version} (+{PROJECT_UA_URL})")
}
