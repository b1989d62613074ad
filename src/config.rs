//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_STATE_FILE: &str = ".registry/state.json";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid REGISTRY_API_BASE_URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },
    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root; always ends with `/` so relative paths join beneath it.
    pub api_base_url: Url,
    pub state_file: PathBuf,
    pub poll_interval: Duration,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `REGISTRY_API_BASE_URL`: default `http://localhost:8000/api/`
    /// - `REGISTRY_STATE_FILE`: default `.registry/state.json`
    /// - `REGISTRY_POLL_INTERVAL_SECS`: default 30
    /// - `REGISTRY_REQUEST_TIMEOUT_SECS`: default 30
    /// - `REGISTRY_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparseable base URL or a zero
    /// duration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(
            lookup("REGISTRY_API_BASE_URL").as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )?;
        let state_file = lookup("REGISTRY_STATE_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);

        let poll_secs = env_seconds(&lookup, "REGISTRY_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        let timeouts = Timeouts {
            request_secs: env_seconds(&lookup, "REGISTRY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_seconds(&lookup, "REGISTRY_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { api_base_url, state_file, poll_interval: Duration::from_secs(poll_secs), timeouts })
    }
}

/// Parse and normalize the API root so it ends with exactly one `/`.
///
/// # Errors
///
/// Returns [`ConfigError::BaseUrl`] when `raw` is not an absolute URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(&format!("{trimmed}/"))
        .map_err(|e| ConfigError::BaseUrl { value: raw.to_owned(), reason: e.to_string() })
}

/// A duration in whole seconds; zero is rejected.
fn env_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match env_parse(lookup, key, default) {
        0 => Err(ConfigError::ZeroDuration { key }),
        secs => Ok(secs),
    }
}

fn env_parse(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
