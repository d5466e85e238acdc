//! Commit Timeline
//!
//! `timeline.json` holds every commit, newest first. Each entry links to the
//! entry that was first in the list when it was appended. The file is read and
//! rewritten whole on every append.

use crate::error::StorageError;
use crate::types::CommitHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A single commit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitEntry {
    pub hash: CommitHash,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    #[serde(default)]
    pub parent: Option<CommitHash>,
}

/// File-backed commit list
pub struct Timeline {
    path: PathBuf,
}

impl Timeline {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty timeline (`[]`)
    pub fn init(&self) -> Result<(), StorageError> {
        fs::write(&self.path, "[]")?;
        Ok(())
    }

    /// All entries, newest first. A missing or blank file is an empty timeline.
    pub fn entries(&self) -> Result<Vec<CommitEntry>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::CorruptTimeline(e.to_string()))
    }

    fn write(&self, entries: &[CommitEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Prepend a new commit whose parent is the current head entry
    pub fn append(
        &self,
        message: &str,
        author: &str,
        timestamp: DateTime<Utc>,
        hash: CommitHash,
    ) -> Result<CommitEntry, StorageError> {
        let mut entries = self.entries()?;
        let entry = CommitEntry {
            hash,
            message: message.to_string(),
            timestamp,
            author: author.to_string(),
            parent: entries.first().map(|e| e.hash.clone()),
        };
        entries.insert(0, entry.clone());
        self.write(&entries)?;

        tracing::info!(
            commit = %entry.hash,
            parent = entry.parent.as_deref().unwrap_or("-"),
            "Appended commit to timeline"
        );
        Ok(entry)
    }

    /// First entry (in list order) whose hash starts with `prefix`.
    ///
    /// An ambiguous prefix resolves to the newest match.
    pub fn find(&self, prefix: &str) -> Result<Option<CommitEntry>, StorageError> {
        if prefix.is_empty() {
            return Ok(None);
        }
        let mut matches = self
            .entries()?
            .into_iter()
            .filter(|e| e.hash.starts_with(prefix));
        let first = matches.next();
        let others = matches.count();
        if first.is_some() && others > 0 {
            tracing::warn!(
                prefix,
                candidates = others + 1,
                "Ambiguous commit prefix, using the newest match"
            );
        }
        Ok(first)
    }

    /// Exact hash lookup
    pub fn get(&self, hash: &str) -> Result<Option<CommitEntry>, StorageError> {
        Ok(self.entries()?.into_iter().find(|e| e.hash == hash))
    }

    pub fn head_entry(&self) -> Result<Option<CommitEntry>, StorageError> {
        Ok(self.entries()?.into_iter().next())
    }

    pub fn parent_of(&self, entry: &CommitEntry) -> Result<Option<CommitEntry>, StorageError> {
        match &entry.parent {
            Some(parent) => self.get(parent),
            None => Ok(None),
        }
    }

    /// Check that every parent refers to an entry further down the list with
    /// a timestamp no later than its child.
    pub fn verify(&self) -> Result<(), StorageError> {
        let entries = self.entries()?;
        let mut position: HashMap<&str, usize> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if position.insert(entry.hash.as_str(), i).is_some() {
                return Err(StorageError::CorruptTimeline(format!(
                    "duplicate commit {}",
                    entry.hash
                )));
            }
        }

        for (i, entry) in entries.iter().enumerate() {
            let Some(parent) = &entry.parent else {
                continue;
            };
            let Some(&p) = position.get(parent.as_str()) else {
                return Err(StorageError::CorruptTimeline(format!(
                    "commit {} has unknown parent {}",
                    entry.hash, parent
                )));
            };
            if p <= i || entries[p].timestamp > entry.timestamp {
                return Err(StorageError::CorruptTimeline(format!(
                    "commit {} is not newer than its parent {}",
                    entry.hash, parent
                )));
            }
        }
        Ok(())
    }
}
