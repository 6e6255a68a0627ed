//! Application configuration.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Remote document store credentials and location.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_db_path() -> String {
    "onemalad.db".to_string()
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_base_url() -> String {
    "https://onemalad.in/uploads".to_string()
}

fn default_base_url() -> String {
    "https://onemalad.in".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            db_path: default_db_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl BackendConfig {
    /// Runtime credential check: a real key, not the template placeholder.
    pub fn is_configured(&self) -> bool {
        match self.api_key.as_deref() {
            Some(key) => key != PLACEHOLDER_API_KEY && key.len() > 10,
            None => false,
        }
    }
}

impl AppConfig {
    /// Loads a TOML file when present, then applies `ONEMALAD_*` overrides.
    pub fn load(path: Option<&Path>) -> StoreResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> StoreResult<Self> {
        toml::from_str(raw).map_err(|err| StoreError::Config(err.to_string()))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("ONEMALAD_API_KEY") {
            self.backend.api_key = Some(key);
        }
        if let Some(path) = lookup("ONEMALAD_DB_PATH") {
            self.backend.db_path = path;
        }
    }
}
