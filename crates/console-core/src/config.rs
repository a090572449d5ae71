//! Configuration management for the console.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default backend API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default interval between token validity checks, in seconds.
pub const DEFAULT_VALIDATE_INTERVAL_SECS: u64 = 60;

/// Main console configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Backend API base URL, e.g. `https://exams.example.com/api`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Seconds between background token validity checks.
    #[serde(default = "default_validate_interval_secs")]
    pub validate_interval_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_validate_interval_secs() -> u64 {
    DEFAULT_VALIDATE_INTERVAL_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_url: default_api_url(),
            validate_interval_secs: default_validate_interval_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Loading configuration file");
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to its file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("EXAMDESK_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(api_url) = std::env::var("EXAMDESK_API_URL") {
            self.api_url = api_url;
        }
        if let Ok(interval) = std::env::var("EXAMDESK_VALIDATE_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse() {
                self.validate_interval_secs = secs;
            }
        }
    }

    /// Reject configurations the HTTP layer cannot work with.
    fn validate(&self) -> CoreResult<()> {
        Url::parse(&self.api_url)?;
        if self.validate_interval_secs == 0 {
            return Err(CoreError::Config(
                "validate_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.validate_interval_secs, 60);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config {
            log_level: "debug".to_string(),
            api_url: "https://exams.example.com/api".to_string(),
            validate_interval_secs: 30,
        };
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded.log_level, "debug");
        assert_eq!(loaded.api_url, "https://exams.example.com/api");
        assert_eq!(loaded.validate_interval_secs, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_url": "https://exams.example.com/api"}"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.api_url, "https://exams.example.com/api");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.validate_interval_secs, 60);
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let config = Config {
            api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = Config {
            validate_interval_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
