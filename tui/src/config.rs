use anyhow::{Context, Result};
use postdeck_core::content::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    /// How much of each excerpt the news list shows
    pub excerpt_chars: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            excerpt_chars: 150,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// `<config dir>/postdeck/config.toml`, or `./config.toml` without a home
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("postdeck").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("postdeck").join("postdeck.db"))
        .unwrap_or_else(|| PathBuf::from("postdeck.db"))
}

/// Read the config at `path`, writing the defaults there first if it is missing.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let toml = toml::to_string(&config).context("Failed to encode default config")?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = load_config(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // The written file reads back to the same values
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nbase_url = \"http://localhost:8080/wp-json/wp/v2\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/wp-json/wp/v2");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui.excerpt_chars, 150);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\nbroken").unwrap();

        assert!(load_config(&path).is_err());
    }
}
