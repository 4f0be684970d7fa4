//! Configuration for the polchat client.
//!
//! Every field is optional in the JSON file and falls back to a default.
//! The backend URL can also come from `POLCHAT_BACKEND_URL`.

use crate::category::Categories;
use crate::message::DEFAULT_GREETING;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides [`Config::base_url`].
pub const BACKEND_URL_ENV: &str = "POLCHAT_BACKEND_URL";

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".polchat/config.json";

/// Main configuration for polchat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the submit endpoint under `base_url`.
    #[serde(default = "default_submit_path")]
    pub submit_path: String,

    /// Category tabs, in display order.
    #[serde(default)]
    pub categories: Categories,

    /// Assistant greeting seeded into each session.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Request timeout. Absent means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_submit_path() -> String {
    "qna".into()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            submit_path: default_submit_path(),
            categories: Categories::default(),
            greeting: default_greeting(),
            request_timeout_seconds: None,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Load `path` if it exists (defaults otherwise), then apply the
    /// environment override.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_override(std::env::var(BACKEND_URL_ENV).ok()))
    }

    /// Replace `base_url` when `url` is set and non-blank.
    #[must_use]
    pub fn with_env_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Full URL of the submit endpoint.
    pub fn submit_url(&self) -> String {
        join_url(&self.base_url, &self.submit_path)
    }

    /// Request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

/// Join a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.submit_url(), "http://localhost:8000/qna");
        assert_eq!(config.categories.len(), 8);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"base_url":"https://chat.example.org/api/"}"#).unwrap();
        assert_eq!(config.submit_url(), "https://chat.example.org/api/qna");
        assert_eq!(config.greeting, DEFAULT_GREETING);
    }

    #[test]
    fn test_empty_categories_fail_to_parse() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"categories":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            categories: Categories::new(["One", "Two"]).unwrap(),
            request_timeout_seconds: Some(30),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_override() {
        let config = Config::default().with_env_override(Some("http://10.0.0.5:9000".into()));
        assert_eq!(config.base_url, "http://10.0.0.5:9000");

        let config = Config::default().with_env_override(Some("  ".into()));
        assert_eq!(config.base_url, "http://localhost:8000");

        let config = Config::default().with_env_override(None);
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h:1/", "/qna"), "http://h:1/qna");
        assert_eq!(join_url("http://h:1", "qna"), "http://h:1/qna");
    }
}
