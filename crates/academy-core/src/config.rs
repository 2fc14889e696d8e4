//! Application configuration management.
//!
//! The configuration holds the API base URL, the last email used to log in
//! and which backend persists the session. It is stored at
//! `~/.config/academy/config.json`; `ACADEMY_API_URL` overrides the URL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage};

/// Application name used for config/data directory paths
const APP_NAME: &str = "academy";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "ACADEMY_API_URL";

/// Where the session is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    /// `session.json` in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Not persisted at all
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub session_backend: SessionBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and catalog cache
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// API base URL: environment, then config file, then the default
    pub fn api_url(&self) -> String {
        Self::resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
    }

    fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|url| !url.trim().is_empty())
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Build the configured session storage backend
    pub fn session_storage(&self) -> Result<Box<dyn SessionStorage>> {
        Ok(match self.session_backend {
            SessionBackend::File => Box::new(FileStorage::new(self.data_dir()?)),
            SessionBackend::Keyring => Box::new(KeyringStorage::new()),
            SessionBackend::Memory => Box::new(MemoryStorage::new()),
        })
    }
}
