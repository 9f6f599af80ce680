//! Application configuration management.
//!
//! Holds the API base URL, request timeout, where tokens are kept, and the
//! last username used to log in.
//!
//! Configuration is stored at `~/.config/moneta/config.json`. The
//! `MONETA_API_URL` environment variable overrides the stored base URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, Storage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "moneta";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token file name inside the cache directory
const TOKEN_FILE: &str = "tokens.json";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Environment variable that overrides `api_base_url`
pub const API_URL_ENV: &str = "MONETA_API_URL";

/// Where the token pair is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorageKind {
    #[default]
    File,
    Keyring,
    Memory,
}

impl std::fmt::Display for TokenStorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStorageKind::File => write!(f, "file"),
            TokenStorageKind::Keyring => write!(f, "keyring"),
            TokenStorageKind::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for TokenStorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(TokenStorageKind::File),
            "keyring" => Ok(TokenStorageKind::Keyring),
            "memory" => Ok(TokenStorageKind::Memory),
            other => Err(format!("Unknown token storage: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub token_storage: TokenStorageKind,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn token_file(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(TOKEN_FILE))
    }

    /// Base URL in effect: environment, then config file, then the default
    pub fn api_base_url(&self) -> String {
        Self::resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_base_url.as_deref())
    }

    fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Token storage backend for the configured kind
    pub fn build_storage(&self) -> Result<Arc<dyn Storage>> {
        Ok(match self.token_storage {
            TokenStorageKind::File => Arc::new(FileStorage::new(self.token_file()?)),
            TokenStorageKind::Keyring => Arc::new(KeyringStorage::new()),
            TokenStorageKind::Memory => Arc::new(MemoryStorage::new()),
        })
    }
}
