//! Layered configuration.
//!
//! Settings are resolved from (lowest to highest priority):
//! 1. compiled defaults,
//! 2. `~/.smart-todo/config.json` or the file given with `--config`,
//! 3. `SMART_TODO_API_URL` / `SMART_TODO_THEME` (a `.env` file is honoured),
//! 4. the `--api-url` flag.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fields::SortMode;
use crate::theme::Theme;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
pub const API_URL_ENV: &str = "SMART_TODO_API_URL";
pub const THEME_ENV: &str = "SMART_TODO_THEME";

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub theme: Theme,
    pub sort: SortMode,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: DEFAULT_API_URL.to_string(),
            theme: Theme::Dark,
            sort: SortMode::Latest,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Resolve settings for this process.
    pub fn load(config_path: Option<&Path>, api_url_flag: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self::resolve(&path, env(API_URL_ENV), env(THEME_ENV), api_url_flag)
    }

    /// Apply every layer in order. Split out so tests need no process env.
    fn resolve(
        path: &Path,
        env_api_url: Option<String>,
        env_theme: Option<String>,
        api_url_flag: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut settings = Self::from_file(path)?.unwrap_or_default();

        if let Some(url) = env_api_url {
            settings.api_url = url;
        }
        if let Some(theme) = env_theme {
            settings.theme = theme.parse()?;
        }
        if let Some(url) = api_url_flag {
            settings.api_url = url.to_string();
        }

        settings.api_url = normalise_api_url(&settings.api_url)?;
        Ok(settings)
    }

    /// Read a config file. A missing file is `Ok(None)`.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let settings = serde_json::from_str(&data)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        Ok(Some(settings))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Directory for the config file and the dashboard log.
pub fn app_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".smart-todo")
}

pub fn default_config_path() -> PathBuf {
    app_dir().join("config.json")
}

/// Validate the URL and make sure it ends with `/` so relative joins keep the path.
pub fn normalise_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let mut url = url::Url::parse(trimmed)
        .map_err(|source| ConfigError::ApiUrl { url: trimmed.to_string(), source })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.to_string())
}
