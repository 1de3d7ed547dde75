//! Configuration handling for the draft client

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default draft service address
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Default autosave period
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Environment variable overriding the service address
pub const API_URL_ENV: &str = "REQUIREMENT_DRAFTS_API_URL";

/// User configuration for the draft client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DraftConfig {
    /// Draft service base URL
    pub api_base_url: Option<String>,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Seconds between autosave attempts
    pub autosave_interval_secs: Option<u64>,
    /// Seconds before a request is abandoned
    pub request_timeout_secs: Option<u64>,
    /// Directory for the local fallback copy
    pub fallback_dir: Option<PathBuf>,
}

impl DraftConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("io", "procurement", "requirement-drafts")
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)?;
                serde_json::from_str(&content)?
            }
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = Some(url);
            }
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn autosave_interval(&self) -> Duration {
        // a zero period would make the interval timer panic
        Duration::from_secs(
            self.autosave_interval_secs
                .unwrap_or(DEFAULT_AUTOSAVE_INTERVAL_SECS)
                .max(1),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Where the fallback copy lives, if anywhere
    pub fn fallback_dir(&self) -> Option<PathBuf> {
        self.fallback_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DraftConfig::default();
        assert!(config.api_base_url.is_none());
        assert!(config.api_token.is_none());
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.autosave_interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = DraftConfig {
            autosave_interval_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.autosave_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_serialization() {
        let config = DraftConfig {
            api_base_url: Some("https://procure.example.com/api".to_string()),
            api_token: Some("secret".to_string()),
            autosave_interval_secs: Some(10),
            request_timeout_secs: Some(5),
            fallback_dir: Some(PathBuf::from("/tmp/drafts")),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: DraftConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.api_base_url(), "https://procure.example.com/api");
        assert_eq!(parsed.api_token.as_deref(), Some("secret"));
        assert_eq!(parsed.autosave_interval(), Duration::from_secs(10));
        assert_eq!(parsed.request_timeout(), Duration::from_secs(5));
        assert_eq!(parsed.fallback_dir(), Some(PathBuf::from("/tmp/drafts")));
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: DraftConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.autosave_interval_secs.is_none());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"api_token": "t", "theme": "dark"}"#;
        let parsed: DraftConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.api_token.as_deref(), Some("t"));
    }

    #[test]
    fn test_load_returns_ok() {
        // Load should fall back to defaults when no config file exists
        let result = DraftConfig::load();
        assert!(result.is_ok());
    }
}
