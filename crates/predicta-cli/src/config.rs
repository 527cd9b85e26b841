//! Configuration for the Predicta CLI
//!
//! Settings come from flags first, then environment variables (a `.env` file
//! in the working directory is honoured), then defaults.

use crate::error::{CliError, Result};
use std::time::Duration;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Default server URL when neither `--server-url` nor the environment sets one.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Default timeout for API requests in seconds.
/// Large uploads and downloads must fit inside it.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Environment variable holding the server URL.
pub const SERVER_URL_ENV: &str = "PREDICTA_SERVER_URL";

/// Environment variable overriding the API timeout.
pub const API_TIMEOUT_ENV: &str = "PREDICTA_API_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Predicta server URL, without a trailing slash
    pub server_url: String,

    /// Per-request timeout
    pub api_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Configuration for an explicit server URL; the timeout still comes
    /// from the environment.
    pub fn with_server_url(server_url: impl Into<String>) -> Result<Self> {
        let server_url = normalize_url(server_url.into())?;
        Ok(Self {
            server_url,
            api_timeout: api_timeout_from_env()?,
        })
    }

    /// Load config from environment variables
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let server_url =
            std::env::var(SERVER_URL_ENV).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::with_server_url(server_url)
    }
}

fn normalize_url(url: String) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CliError::config(format!(
            "server URL '{url}' must start with http:// or https://"
        )));
    }
    Ok(trimmed.to_string())
}

fn api_timeout_from_env() -> Result<Duration> {
    match std::env::var(API_TIMEOUT_ENV) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                CliError::config(format!("{API_TIMEOUT_ENV} must be a positive number of seconds"))
            }),
        Err(_) => Ok(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS)),
    }
}
