//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::state::session::ProfileFailurePolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROFILE_FRESHNESS_MS: u64 = 120_000;

const TOKEN_DIR_NAME: &str = "humanize";
const TOKEN_FILE_NAME: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("no config directory available; set HUMANIZE_TOKEN_FILE")]
    NoTokenPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token_file: PathBuf,
    pub timeouts: HttpTimeouts,
    pub profile_freshness: Duration,
    pub profile_failure: ProfileFailurePolicy,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `HUMANIZE_API_URL`: backend base URL, default `http://localhost:5000`
    /// - `HUMANIZE_TOKEN_FILE`: token path, default `<config dir>/humanize/token`
    /// - `HUMANIZE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HUMANIZE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `HUMANIZE_PROFILE_FRESHNESS_MS`: default 120000
    /// - `HUMANIZE_PROFILE_FAILURE`: `keep` (default) or `clear`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown failure policy, or when no token path
    /// is configured and the platform has no config directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(&std::env::var("HUMANIZE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()));
        let token_file = match std::env::var("HUMANIZE_TOKEN_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_token_file()?,
        };
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("HUMANIZE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("HUMANIZE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let profile_freshness =
            Duration::from_millis(env_parse_u64("HUMANIZE_PROFILE_FRESHNESS_MS", DEFAULT_PROFILE_FRESHNESS_MS));
        let profile_failure = parse_failure_policy(std::env::var("HUMANIZE_PROFILE_FAILURE").ok().as_deref())?;

        Ok(Self { api_url, token_file, timeouts, profile_freshness, profile_failure })
    }

    /// Config with defaults for everything except the token path.
    #[must_use]
    pub fn with_token_file(token_file: impl Into<PathBuf>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_file: token_file.into(),
            timeouts: HttpTimeouts::default(),
            profile_freshness: Duration::from_millis(DEFAULT_PROFILE_FRESHNESS_MS),
            profile_failure: ProfileFailurePolicy::default(),
        }
    }
}

#[must_use]
pub fn normalize_api_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Default token location: `<config dir>/humanize/token`.
///
/// # Errors
///
/// Returns [`ConfigError::NoTokenPath`] when the platform reports no config directory.
pub fn default_token_file() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(TOKEN_DIR_NAME).join(TOKEN_FILE_NAME))
        .ok_or(ConfigError::NoTokenPath)
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_failure_policy(raw: Option<&str>) -> Result<ProfileFailurePolicy, ConfigError> {
    match raw.map(str::trim).unwrap_or("keep") {
        "keep" | "" => Ok(ProfileFailurePolicy::KeepSession),
        "clear" => Ok(ProfileFailurePolicy::ClearSession),
        other => Err(ConfigError::Parse(format!(
            "unknown HUMANIZE_PROFILE_FAILURE '{other}' (expected 'keep' or 'clear')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
