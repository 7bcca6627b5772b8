use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("taskdesk")
}

/// Connection settings for the hosted store. Read from the config file,
/// with environment overrides for deployments that inject credentials.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StoreConfig {
    /// REST root of the store, e.g. `https://proj.example.co/rest/v1`.
    pub store_url: String,
    /// API key; sent as both the apikey header and the bearer token.
    pub store_key: String,
    pub debug_logging: bool,
}

impl StoreConfig {
    pub fn config_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Load from disk (missing file yields defaults), then apply
    /// `TASKDESK_STORE_URL` / `TASKDESK_STORE_KEY` overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(Self::config_path()) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("unreadable config, falling back to defaults: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        if let Ok(url) = std::env::var("TASKDESK_STORE_URL") {
            config.store_url = url;
        }
        if let Ok(key) = std::env::var("TASKDESK_STORE_KEY") {
            config.store_key = key;
        }
        config
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(path, raw)
    }

    /// Both endpoint and key must be present before connecting.
    pub fn ensure_usable(&self) -> Result<()> {
        if self.store_url.trim().is_empty() {
            return Err(Error::Config("store URL is not configured".to_string()));
        }
        if self.store_key.trim().is_empty() {
            return Err(Error::Config("store key is not configured".to_string()));
        }
        Ok(())
    }
}
