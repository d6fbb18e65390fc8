//! Configuration schema for partsbin
//!
//! Configuration is stored at `~/.config/partsbin/config.toml`

use crate::cache::WriteMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Remote used when `get` is called without one
    pub default_remote: Option<String>,

    /// HTTP timeout for remote fetches, in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            default_remote: None,
            fetch_timeout_secs: 30,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root override (default: platform cache dir + `/partsbin`)
    pub dir: Option<PathBuf>,

    /// Write the index to a temp file and rename it into place
    pub atomic_writes: bool,
}

impl CacheConfig {
    /// Index write mode selected by this config
    pub fn write_mode(&self) -> WriteMode {
        if self.atomic_writes {
            WriteMode::Atomic
        } else {
            WriteMode::Direct
        }
    }
}
