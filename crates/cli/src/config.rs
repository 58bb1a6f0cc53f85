use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pocketsync_api::PocketClient;
use pocketsync_core::ratelimit::RateLimiter;
use pocketsync_core::router::RouterOptions;
use pocketsync_core::state::StateStore;
use pocketsync_core::store::Store;
use pocketsync_core::store::local::LocalStore;
use pocketsync_core::store::memory::MemoryStore;
use pocketsync_core::sync::SyncOptions;

const CONFIG_FILE: &str = "pocketsync.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Application key issued by the bookmarking service.
    pub consumer_key: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

fn default_redirect_uri() -> String {
    "pocketsync:authorization-finished".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// File-per-key store under a directory (default: the user data dir).
    Local { path: Option<PathBuf> },
    /// Volatile store; state dies with the process.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Local { path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_calls: usize,
    pub window_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_calls: 320,
            window_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub page_size: u64,
    pub tag_ttl_hours: i64,
    pub check_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            tag_ttl_hours: 24,
            check_interval_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_hours: 5 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub socket: Option<PathBuf>,
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pocketsync")
            .join(CONFIG_FILE)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "config not found at {} (run `pocketsync init` first)",
                path.display()
            )
        })?;
        toml::from_str(&content).context("failed to parse config")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn starter(consumer_key: String) -> Self {
        Self {
            api: ApiConfig {
                consumer_key,
                redirect_uri: default_redirect_uri(),
            },
            storage: StorageConfig::default(),
            limits: LimitsConfig::default(),
            sync: SyncConfig::default(),
            cache: CacheConfig::default(),
            daemon: DaemonConfig::default(),
        }
    }

    fn data_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pocketsync")
            .join("state")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.daemon.socket.clone().unwrap_or_else(|| {
            dirs::runtime_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("pocketsync.sock")
        })
    }

    pub fn open_state(&self) -> Result<StateStore> {
        let store: Arc<dyn Store> = match &self.storage {
            StorageConfig::Local { path } => {
                let path = path.clone().unwrap_or_else(Self::data_path);
                Arc::new(LocalStore::init(path)?)
            }
            StorageConfig::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(StateStore::new(store))
    }

    pub fn client(&self) -> PocketClient {
        PocketClient::new(self.api.consumer_key.clone())
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            self.limits.max_calls,
            Duration::from_secs(self.limits.window_secs),
        )
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            page_size: self.sync.page_size,
            ..SyncOptions::default()
        }
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache.ttl_hours)
    }

    pub fn tag_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.sync.tag_ttl_hours)
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            redirect_uri: self.api.redirect_uri.clone(),
            cache_ttl: self.cache_ttl(),
            ..RouterOptions::default()
        }
    }
}
