use std::{env, time::Duration};

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_APP_ID: &str = "default-app-id";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PREDICTION_API_URL is not a valid base URL: {0}")]
    InvalidApiUrl(#[from] url::ParseError),

    #[error("HTTP_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub http_timeout: Duration,
    /// Raw identity configuration blob. Parsed (and possibly rejected) by the
    /// session bootstrapper, never here.
    pub identity_config: Option<String>,
    pub initial_auth_token: Option<String>,
    pub app_id: String,
}

impl AppConfig {
    /// Reads the process environment. `.env` is loaded by the binary beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = non_empty("PREDICTION_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base_url = Url::parse(&with_trailing_slash(&raw_url))?;

        let http_timeout = match non_empty("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url,
            http_timeout,
            identity_config: non_empty("IDENTITY_CONFIG"),
            initial_auth_token: non_empty("INITIAL_AUTH_TOKEN"),
            app_id: non_empty("APP_ID").unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
        })
    }
}

// `Url::join` drops the last path segment unless the base ends with '/'.
fn with_trailing_slash(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
