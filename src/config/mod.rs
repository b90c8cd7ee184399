//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. Environment variables
//! 2. `~/.config/tidycache/config.toml`
//! 3. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    pub cache: CacheConfig,
}

/// Wrapped-tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Binary name or path of the wrapped analysis tool.
    pub path: String,

    /// Absolute path prefix replaced by `.` in preprocessed output before
    /// hashing, so checkouts at different locations fingerprint identically.
    pub base_dir: Option<PathBuf>,

    /// Mix the tool binary's own content into the fingerprint.
    pub hash_binary: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: constants::DEFAULT_TOOL.to_string(),
            base_dir: None,
            hash_binary: false,
        }
    }
}

/// Cache backend selection and settings.
///
/// The object store wins over the key-value service when both are
/// configured; the filesystem store is the fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Override for the local store directory (default: `~/.cache/tidycache`).
    pub dir: Option<PathBuf>,

    pub object_store: Option<ObjectStoreConfig>,
    pub kv: Option<KvConfig>,
}

/// Remote object-storage bucket settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    /// API endpoint override (default: Google Cloud Storage).
    pub url: Option<String>,
    pub bucket: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for KvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvConfig")
            .field("url", &self.url)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Remote key-value service settings.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConfig {
    pub url: String,
    pub password: Option<String>,
    /// Optional key prefix, kept as a path segment before the hex key.
    pub namespace: Option<String>,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads the global config file when present, then applies
    /// environment variable overrides.
    pub fn load(env: &Env) -> Result<Self, ConfigError> {
        let mut config = match Self::global_config_path() {
            Some(path) if path.exists() => Self::load_file(&path)?,
            _ => Config::default(),
        };

        config.apply_env_vars(env);
        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.get(constants::ENV_BINARY) {
            self.tool.path = val;
        }
        if let Some(val) = env.get(constants::ENV_BASE_DIR) {
            self.tool.base_dir = Some(PathBuf::from(val));
        }
        if let Some(val) = env.get(constants::ENV_HASH_BINARY) {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => self.tool.hash_binary = true,
                "false" | "0" | "no" | "off" => self.tool.hash_binary = false,
                _ => eprintln!(
                    "Warning: ignoring invalid {} value: {val}",
                    constants::ENV_HASH_BINARY
                ),
            }
        }
        if let Some(val) = env.get(constants::ENV_CACHE_DIR) {
            self.cache.dir = Some(PathBuf::from(val));
        }

        // A bucket name in the environment enables the object store outright
        if let Some(bucket) = env.get(constants::ENV_OBJECT_STORE_BUCKET) {
            let store = self.cache.object_store.get_or_insert_with(Default::default);
            store.bucket = bucket;
        }
        if let Some(store) = self.cache.object_store.as_mut() {
            if let Some(url) = env.get(constants::ENV_OBJECT_STORE_URL) {
                store.url = Some(url);
            }
            if let Some(token) = env.get(constants::ENV_OBJECT_STORE_TOKEN) {
                store.token = Some(token);
            }
        }

        // Same for the key-value service URL
        if let Some(url) = env.get(constants::ENV_KV_URL) {
            let kv = self.cache.kv.get_or_insert_with(Default::default);
            kv.url = url;
        }
        if let Some(kv) = self.cache.kv.as_mut() {
            if let Some(password) = env.get(constants::ENV_KV_PASSWORD) {
                kv.password = Some(password);
            }
            if let Some(namespace) = env.get(constants::ENV_KV_NAMESPACE) {
                kv.namespace = Some(namespace);
            }
        }
    }
}
