//! Client configuration.
//!
//! A `ClientConfig` is built once and handed to `DncClient::new`; nothing is
//! read from process-wide state after that.

use std::time::Duration;

use crate::error::ApiError;

/// Base URL shipped with the original SDKs; replace it with your deployment.
pub const DEFAULT_BASE_URL: &str = "https://your-node-server.com/api";

pub const ENV_BASE_URL: &str = "DNCLEAR_BASE_URL";
pub const ENV_API_KEY: &str = "DNCLEAR_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "DNCLEAR_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Overall per-request timeout. `None` leaves ureq's default in place.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load from `DNCLEAR_BASE_URL`, `DNCLEAR_API_KEY` and
    /// `DNCLEAR_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = lookup(ENV_API_KEY)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::ConfigError(format!("{ENV_API_KEY} is not set")))?;

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ApiError::ConfigError(format!(
                        "{ENV_TIMEOUT_SECS} must be a positive integer, got {raw:?}"
                    )))
                }
            },
        };

        Ok(Self {
            base_url,
            api_key,
            timeout,
        })
    }
}
