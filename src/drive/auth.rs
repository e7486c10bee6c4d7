//! Access-token authentication.
//!
//! Token acquisition (the OAuth consent flow) happens outside scrollshot; this
//! reads a ready access token from the environment. `.env` files are honoured
//! because the binary loads them at startup.

use async_trait::async_trait;
use std::sync::Arc;

use super::backend::{Authenticator, DriveBackend};
use super::client::{DriveClient, DRIVE_API_BASE_URL, DRIVE_UPLOAD_BASE_URL};
use super::error::DriveError;

/// The environment variable holding the Drive OAuth access token.
pub const DRIVE_TOKEN_ENV: &str = "SCROLLSHOT_DRIVE_TOKEN";

/// Builds a [`DriveClient`] from a token in the environment.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    token_env: String,
    api_base_url: String,
    upload_base_url: String,
}

impl Default for TokenAuthenticator {
    fn default() -> Self {
        Self::new(DRIVE_TOKEN_ENV)
    }
}

impl TokenAuthenticator {
    pub fn new(token_env: impl Into<String>) -> Self {
        Self {
            token_env: token_env.into(),
            api_base_url: DRIVE_API_BASE_URL.to_string(),
            upload_base_url: DRIVE_UPLOAD_BASE_URL.to_string(),
        }
    }

    pub fn with_base_urls(mut self, api_base_url: &str, upload_base_url: &str) -> Self {
        self.api_base_url = api_base_url.to_string();
        self.upload_base_url = upload_base_url.to_string();
        self
    }

    pub fn token_env(&self) -> &str {
        &self.token_env
    }

    /// Whether the token variable is set and non-empty.
    pub fn has_token(&self) -> bool {
        std::env::var(&self.token_env).is_ok_and(|t| !t.trim().is_empty())
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self) -> Result<Arc<dyn DriveBackend>, DriveError> {
        let token = std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DriveError::MissingToken {
                env: self.token_env.clone(),
            })?;

        let client = DriveClient::with_base_urls(
            token,
            self.api_base_url.clone(),
            self.upload_base_url.clone(),
        )?;
        log::info!("Authenticated with Google Drive");
        Ok(Arc::new(client))
    }
}
