//! Access token handling.
//!
//! The token is obtained once, before a client is built, and then travels
//! inside an immutable [`Credentials`] value that can be shared freely
//! between concurrent callers.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::constants::ACCEPT_HEADER_VALUE;

/// Environment variable read by [`EnvCredentialProvider`].
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Errors raised while obtaining credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The token was empty or whitespace.
    #[error("access token is empty")]
    EmptyToken,

    /// No token in the environment.
    #[error("environment variable {name} is not set")]
    MissingEnv {
        /// Variable that was looked up.
        name: String,
    },

    /// Interactive input failed.
    #[error("failed to read access token: {reason}")]
    Prompt {
        /// Why the prompt failed.
        reason: String,
    },
}

/// An opaque personal access token plus the fixed headers sent with it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Wraps a token. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptyToken`] if nothing remains.
    pub fn new(token: impl AsRef<str>) -> Result<Self, CredentialError> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return Err(CredentialError::EmptyToken);
        }
        Ok(Self {
            token: token.to_string(),
        })
    }

    /// Headers attached to every request.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("authorization", format!("token {}", self.token)),
            ("accept", ACCEPT_HEADER_VALUE.to_string()),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials before a client is constructed.
pub trait CredentialProvider {
    /// Produces the token to use.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when no usable token is available.
    fn credentials(&self) -> Result<Credentials, CredentialError>;
}

/// Provider for a token already at hand.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Wraps ready-made credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        Ok(self.credentials.clone())
    }
}

/// Reads the token from an environment variable (`GITHUB_TOKEN` by default).
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    var: String,
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

impl EnvCredentialProvider {
    /// Reads from `var` instead of `GITHUB_TOKEN`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        let value = std::env::var(&self.var).map_err(|_| CredentialError::MissingEnv {
            name: self.var.clone(),
        })?;
        debug!(var = %self.var, "access token read from environment");
        Credentials::new(value)
    }
}
