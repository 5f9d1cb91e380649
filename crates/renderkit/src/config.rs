// File: src/config.rs
// Purpose: Configuration parsing from renderkit.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

/// Render store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Storage backend: "memory" or "filesystem"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Cache directory for the filesystem backend
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum cache size in megabytes (filesystem backend)
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
}

// Default values
fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_max_size_mb() -> u64 {
    500
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            max_size_mb: default_max_size_mb(),
        }
    }
}

impl Config {
    /// Load configuration from renderkit.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        // Parse TOML
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./renderkit.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("renderkit.toml")
    }
}
