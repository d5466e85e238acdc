//! Repository metadata and head tracking
//!
//! `metadata.json` records the repository version, creation time and the
//! current head commit. The head is written separately from the timeline, so
//! after a crash the two may disagree; the timeline is authoritative.

use crate::error::{ApiError, StorageError};
use crate::timeline::CommitEntry;
use crate::types::CommitHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_max_snapshots() -> u32 {
    100
}

/// Settings persisted alongside the metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoConfig {
    #[serde(default)]
    pub auto_commit: bool,
    #[serde(default)]
    pub compression_enabled: bool,
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: u32,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            auto_commit: false,
            compression_enabled: false,
            max_snapshots: default_max_snapshots(),
        }
    }
}

/// Summary of the head commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub hash: CommitHash,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
}

impl From<&CommitEntry> for CommitInfo {
    fn from(entry: &CommitEntry) -> Self {
        Self {
            hash: entry.hash.clone(),
            message: entry.message.clone(),
            timestamp: entry.timestamp,
            author: entry.author.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMetadata {
    pub version: String,
    pub created: DateTime<Utc>,
    pub head: Option<CommitHash>,
    #[serde(default)]
    pub config: RepoConfig,
    #[serde(default)]
    pub last_commit: Option<CommitInfo>,
}

impl RepoMetadata {
    /// Metadata for a freshly initialized repository
    pub fn new(created: DateTime<Utc>, config: RepoConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created,
            head: None,
            config,
            last_commit: None,
        }
    }

    /// Point the head at `entry`
    pub fn advance_head(&mut self, entry: &CommitEntry) {
        self.head = Some(entry.hash.clone());
        self.last_commit = Some(CommitInfo::from(entry));
    }

    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ApiError::StorageError(StorageError::Serialization(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        let json = serde_json::to_string_pretty(self).map_err(StorageError::from)?;
        fs::write(path, json)?;
        Ok(())
    }
}
