//! Configuration file handling.
//!
//! Settings live in `<config_dir>/spacefeed/config.toml`.  Every field has a
//! serde default, so an empty or partial file is valid; a missing file is
//! created with the defaults on first run.  `SPACEFEED_API_URL` overrides
//! `api_url` from the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::source::Cursor;

const APP_DIR: &str = "spacefeed";
const API_URL_ENV: &str = "SPACEFEED_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the photo-listing API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// First cursor to request (`YYYY-MM-DD`).  Today when unset.
    #[serde(default)]
    pub start_date: Option<String>,

    /// How many rows from the end of the feed count as "near bottom".
    #[serde(default = "default_prefetch_margin")]
    pub prefetch_margin: usize,

    #[serde(default = "default_log_path")]
    pub log_path: String,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_prefetch_margin() -> usize {
    3
}

fn default_log_path() -> String {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("spacefeed.log")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            start_date: None,
            prefetch_margin: default_prefetch_margin(),
            log_path: default_log_path(),
        }
    }
}

impl Config {
    /// Parse config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Load from `path`, writing the defaults there if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
    }

    /// Cursor for the first page: `start_date` if set, otherwise today.
    pub fn start_cursor(&self) -> Result<Cursor, ConfigError> {
        match &self.start_date {
            Some(date) => {
                Cursor::parse_date(date).ok_or_else(|| ConfigError::StartDate(date.clone()))
            }
            None => Ok(Cursor::today()),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }
}
