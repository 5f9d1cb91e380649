//! Engine configuration types

use anyhow::{bail, Result};
use renderkit::config::CacheConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Regeneration engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Storage backend for render records
    pub storage: StorageBackend,
}

/// Storage backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory storage (fast, non-persistent)
    #[default]
    Memory,

    /// Filesystem storage (persistent, single-instance)
    Filesystem(FilesystemConfig),
}

/// Filesystem storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Cache directory path
    pub path: PathBuf,

    /// Maximum cache size in megabytes
    pub max_size_mb: u64,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".renderkit/cache"),
            max_size_mb: 500,
        }
    }
}

impl EngineConfig {
    /// Build runtime config from the application's `[cache]` settings
    pub fn from_settings(settings: &CacheConfig) -> Result<Self> {
        let storage = match settings.backend.as_str() {
            "memory" => StorageBackend::Memory,
            "filesystem" => {
                let defaults = FilesystemConfig::default();
                StorageBackend::Filesystem(FilesystemConfig {
                    path: settings.path.clone().unwrap_or(defaults.path),
                    max_size_mb: settings.max_size_mb,
                })
            }
            other => bail!("Unknown cache backend: {}", other),
        };

        Ok(Self { storage })
    }
}
