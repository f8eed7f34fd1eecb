//! Access token lookup: environment first, then a hidden prompt.

use std::io::{self, IsTerminal};

use anyhow::{Result, bail};
use dialoguer::Password;
use ghfetch_core::api::{
    CredentialError, CredentialProvider, Credentials, EnvCredentialProvider, TOKEN_ENV_VAR,
};
use tracing::{debug, info};

/// Asks for the token on the terminal without echoing it.
#[derive(Debug, Default)]
pub struct PromptCredentialProvider;

impl CredentialProvider for PromptCredentialProvider {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        let token = Password::new()
            .with_prompt("GitHub access token")
            .interact()
            .map_err(|e| CredentialError::Prompt {
                reason: e.to_string(),
            })?;
        Credentials::new(token)
    }
}

/// Reads `GITHUB_TOKEN`, falling back to a prompt when stdin is a terminal.
pub fn resolve_credentials() -> Result<Credentials> {
    match EnvCredentialProvider::default().credentials() {
        Ok(credentials) => Ok(credentials),
        Err(CredentialError::MissingEnv { name }) => {
            if !io::stdin().is_terminal() {
                bail!("no access token: set {name} or run interactively");
            }
            debug!(var = %name, "token not in environment, prompting");
            info!("Set {TOKEN_ENV_VAR} to skip this prompt.");
            Ok(PromptCredentialProvider.credentials()?)
        }
        Err(e) => Err(e.into()),
    }
}
