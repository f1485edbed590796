use crate::audit::{AuditInfo, UNKNOWN};
use crate::cache::{CacheEntryOptions, CacheOptions, CacheStore, MemoryCacheStore, SqliteCacheStore};
use crate::error::DataVaultError;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "DATAVAULT_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DataVaultConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub audit: AuditSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

fn default_command_timeout_secs() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditSettings {
    #[serde(default = "default_app_id")]
    pub app_id: String,
}

fn default_app_id() -> String {
    UNKNOWN.to_string()
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheStoreKind {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSettings {
    #[serde(default = "default_sliding_minutes")]
    pub default_sliding_minutes: u64,
    #[serde(default = "default_lookup_absolute_minutes")]
    pub lookup_absolute_minutes: u64,
    #[serde(default)]
    pub store: CacheStoreKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqlite_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CacheRule>,
}

fn default_sliding_minutes() -> u64 {
    crate::cache::options::DEFAULT_SLIDING_MINUTES
}

fn default_lookup_absolute_minutes() -> u64 {
    60
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_sliding_minutes: default_sliding_minutes(),
            lookup_absolute_minutes: default_lookup_absolute_minutes(),
            store: CacheStoreKind::default(),
            sqlite_path: None,
            rules: Vec::new(),
        }
    }
}

/// Default entry options for every cache whose name matches `pattern`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheRule {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sliding_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_minutes: Option<u64>,
}

impl CacheRule {
    fn entry_options(&self) -> CacheEntryOptions {
        CacheEntryOptions {
            absolute_expiration: self.absolute_minutes.map(minutes),
            sliding_expiration: self.sliding_minutes.map(minutes),
        }
    }
}

fn minutes(count: u64) -> Duration {
    Duration::from_secs(count * 60)
}

impl DataVaultConfig {
    /// `$DATAVAULT_CONFIG` if set, otherwise `datavault/config.toml` under the
    /// platform config directory
    pub fn get_config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("datavault");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::parse(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: DataVaultConfig = toml::from_str(content)?;
        debug!("Loaded config with {} cache rules", config.cache.rules.len());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        debug!("Saving config to: {:?}", config_path);

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
                fs::create_dir_all(config_dir)
                    .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
                info!("Created config directory: {:?}", config_dir);
            }
        }

        let config_content = self.to_toml()?;
        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.database.command_timeout_secs)
    }

    pub fn lookup_expiration(&self) -> Duration {
        minutes(self.cache.lookup_absolute_minutes)
    }

    pub fn audit_info(&self) -> AuditInfo {
        AuditInfo::for_app(self.audit.app_id.clone())
    }

    /// Cache options with the configured rules in file order
    pub fn cache_options(&self) -> Result<CacheOptions> {
        let global = CacheEntryOptions::sliding(minutes(self.cache.default_sliding_minutes));

        self.cache.rules.iter().try_fold(CacheOptions::new(global), |options, rule| {
            options
                .rule(&rule.pattern, rule.entry_options())
                .map_err(|e| {
                    anyhow::Error::from(DataVaultError::Config(format!(
                        "invalid cache rule pattern '{}': {}",
                        rule.pattern, e
                    )))
                })
        })
    }

    pub async fn build_cache_store(&self) -> Result<Arc<dyn CacheStore>> {
        match self.cache.store {
            CacheStoreKind::Memory => Ok(Arc::new(MemoryCacheStore::new())),
            CacheStoreKind::Sqlite => {
                let store = match &self.cache.sqlite_path {
                    Some(path) => SqliteCacheStore::connect(path).await?,
                    None => SqliteCacheStore::connect_memory().await?,
                };
                Ok(Arc::new(store))
            }
        }
    }
}
