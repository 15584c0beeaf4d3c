//! Application configuration types

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use xray_core::StoreConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StorageConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Where the reference store listens
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Reference store persistence
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub database_path: Option<String>,
}

impl StorageConfig {
    /// Configured database file, or `~/.xray/xray.db`
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(xray_store::default_db_path)
    }
}

/// How the CLI reaches a trace store
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    xray_core::config::DEFAULT_TIMEOUT.as_millis() as u64
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: xray_core::config::DEFAULT_BASE_URL.to_string(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }
}
