pub mod rest_provider;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;

pub use rest_provider::RestIdentityProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid identity configuration: {0}")]
    InvalidConfig(String),

    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid identity endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("identity provider rejected sign-in ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("identity provider returned no user")]
    MissingUser,
}

/// Client-side identity configuration blob.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConfig {
    pub api_key: String,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

impl IdentityConfig {
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let config: IdentityConfig =
            serde_json::from_str(raw).map_err(|e| IdentityError::InvalidConfig(e.to_string()))?;
        if config.api_key.trim().is_empty() {
            return Err(IdentityError::InvalidConfig("apiKey is empty".into()));
        }
        Ok(config)
    }
}

/// The external identity service. Only a session identifier is ever consumed.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<AuthUser, IdentityError>;

    async fn sign_in_anonymously(&self) -> Result<AuthUser, IdentityError>;

    /// Session-change notifications. The current user (possibly `None`) is
    /// delivered right after subscribing.
    fn subscribe(&self) -> broadcast::Receiver<Option<AuthUser>>;
}
