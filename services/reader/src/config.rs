//! services/reader/src/config.rs
//!
//! Defines the client's process configuration and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. The remote store target itself is user
//! data and lives in the settings file, see `settings.rs`.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub github_api_url: String,
    pub log_level: Level,
    pub http_timeout: Duration,
    pub user_agent: String,
    /// Secret of the bundled super-admin. Without it the bundled document
    /// cannot be published to an empty remote store.
    pub bootstrap_secret: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("state_dir", &self.state_dir)
            .field("github_api_url", &self.github_api_url)
            .field("log_level", &self.log_level)
            .field("http_timeout", &self.http_timeout)
            .field("user_agent", &self.user_agent)
            .field(
                "bootstrap_secret",
                &self.bootstrap_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let state_dir = lookup("READER_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.reader"));

        let github_api_url =
            lookup("GITHUB_API_URL").unwrap_or_else(|| "https://api.github.com".to_string());
        if !github_api_url.starts_with("http://") && !github_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "GITHUB_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", github_api_url),
            ));
        }

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => Duration::from_secs(30),
        };

        let user_agent =
            lookup("READER_USER_AGENT").unwrap_or_else(|| "manhua-reader".to_string());

        let bootstrap_secret = lookup("READER_BOOTSTRAP_SECRET").filter(|s| !s.is_empty());

        Ok(Self {
            state_dir,
            github_api_url,
            log_level,
            http_timeout,
            user_agent,
            bootstrap_secret,
        })
    }

    pub fn device_id_path(&self) -> PathBuf {
        self.state_dir.join("device_id")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.state_dir.join("settings.json")
    }
}
