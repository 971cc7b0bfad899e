//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_STATE_DIR: &str = ".wardrobe";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the wardrobe backend (no trailing slash)
    pub api_url: String,
    /// Directory holding the durable session file
    pub state_dir: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".to_string(),
            state_dir: PathBuf::from("target/test-state"),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Config pointing at a specific backend, other fields from `test_default`.
    pub fn for_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_base_url(api_url.into()),
            ..Self::test_default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("WARDROBE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "WARDROBE_API_URL",
                value: api_url,
            });
        }

        let timeout_secs = match env::var("WARDROBE_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "WARDROBE_REQUEST_TIMEOUT_SECS",
                value: raw,
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url: normalize_base_url(api_url),
            state_dir: env::var("WARDROBE_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR)),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Path of the durable session file.
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
