//! Configuration
//!
//! Layered configuration for a notevc repository. Sources, lowest precedence
//! first: built-in defaults, the global `$XDG_CONFIG_HOME/notevc/config.toml`,
//! the repository's `.notevc/config.toml`, then `NOTEVC__*` environment
//! variables (`__` separates nested keys).

mod facade;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::logging::LoggingConfig;
use crate::store::COMPRESSION_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteVcConfig {
    /// Author recorded on commits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl NoteVcConfig {
    /// Resolve the commit author: configured value, then `USER`/`USERNAME`,
    /// then `"unknown"`.
    pub fn author_name(&self) -> String {
        self.author
            .clone()
            .filter(|a| !a.trim().is_empty())
            .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
            .or_else(|| std::env::var("USERNAME").ok().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn default_compression() -> bool {
    true
}

fn default_compression_threshold() -> usize {
    COMPRESSION_THRESHOLD
}

/// Object store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Gzip objects larger than `compression_threshold` bytes
    #[serde(default = "default_compression")]
    pub compression: bool,

    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            compression: default_compression(),
            compression_threshold: default_compression_threshold(),
        }
    }
}
