//! Snapshot storage
//!
//! Snapshots are written as pretty JSON under a date-partitioned tree:
//! `blocks/YYYY/MM/DD/blocks-HH-MM-SS-<sanitized path>.json` (UTC).
//!
//! Lookups walk the whole tree on every call; there is no index. Corrupt
//! snapshot files are skipped so a single bad file never hides the rest of a
//! note's history.

use crate::error::StorageError;
use crate::parser::{Block, ParsedFile};
use crate::snapshot::{BlockSnapshot, BlockState};
use crate::store::BlobStore;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

const SNAPSHOT_PREFIX: &str = "blocks-";
const SNAPSHOT_SUFFIX: &str = ".json";

/// Replace path separators so a note path can be embedded in a file name
pub fn sanitize_path(file_path: &str) -> String {
    file_path.replace(['/', '\\'], "_")
}

/// Snapshot store rooted at the `blocks` directory
pub struct SnapshotStore {
    blocks_dir: PathBuf,
    objects: Arc<dyn BlobStore>,
}

impl SnapshotStore {
    pub fn new(blocks_dir: impl Into<PathBuf>, objects: Arc<dyn BlobStore>) -> Self {
        Self {
            blocks_dir: blocks_dir.into(),
            objects,
        }
    }

    pub fn blocks_dir(&self) -> &Path {
        &self.blocks_dir
    }

    pub fn objects(&self) -> &dyn BlobStore {
        self.objects.as_ref()
    }

    /// Where the snapshot for `file_path` at `timestamp` is written
    pub fn snapshot_path(&self, file_path: &str, timestamp: DateTime<Utc>) -> PathBuf {
        let date_dir = timestamp.format("%Y/%m/%d").to_string();
        let file_name = format!(
            "{}{}-{}{}",
            SNAPSHOT_PREFIX,
            timestamp.format("%H-%M-%S"),
            sanitize_path(file_path),
            SNAPSHOT_SUFFIX
        );
        self.blocks_dir.join(date_dir).join(file_name)
    }

    /// Store every block's content and build the snapshot without persisting it.
    pub fn snapshot_of(
        &self,
        parsed: &ParsedFile,
        timestamp: DateTime<Utc>,
    ) -> Result<BlockSnapshot, StorageError> {
        let blocks = parsed
            .blocks
            .iter()
            .map(|block| {
                let hash = self.objects.store_text(&block.content)?;
                Ok(BlockState::from_block(block, hash))
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(BlockSnapshot {
            file_path: parsed.path.clone(),
            timestamp,
            blocks,
            front_matter: parsed.front_matter.clone(),
        })
    }

    /// Store block contents and persist a snapshot for `parsed` at `timestamp`.
    ///
    /// A snapshot for the same file within the same second overwrites the
    /// previous one.
    pub fn store_blocks(
        &self,
        parsed: &ParsedFile,
        timestamp: DateTime<Utc>,
    ) -> Result<BlockSnapshot, StorageError> {
        let snapshot = self.snapshot_of(parsed, timestamp)?;
        let path = self.snapshot_path(&snapshot.file_path, timestamp);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)?;

        tracing::debug!(
            file = %snapshot.file_path,
            blocks = snapshot.blocks.len(),
            path = %path.display(),
            "Stored block snapshot"
        );
        Ok(snapshot)
    }

    /// Read a single snapshot file
    pub fn read_snapshot(&self, path: &Path) -> Result<BlockSnapshot, StorageError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| StorageError::CorruptSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Walk the snapshot tree, optionally restricted to file names containing
    /// `name_filter`, skipping anything that fails to read or parse.
    fn scan(&self, name_filter: Option<&str>) -> Vec<BlockSnapshot> {
        if !self.blocks_dir.exists() {
            return Vec::new();
        }

        let mut snapshots = Vec::new();
        for entry in WalkDir::new(&self.blocks_dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read snapshot directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !file_name.starts_with(SNAPSHOT_PREFIX) || !file_name.ends_with(SNAPSHOT_SUFFIX) {
                continue;
            }
            if let Some(filter) = name_filter {
                if !file_name.contains(filter) {
                    continue;
                }
            }

            match self.read_snapshot(entry.path()) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    tracing::warn!("Skipping unreadable snapshot {}: {}", entry.path().display(), e);
                }
            }
        }
        snapshots
    }

    fn scan_file(&self, file_path: &str) -> impl Iterator<Item = BlockSnapshot> + '_ {
        let owned = file_path.to_string();
        self.scan(Some(&sanitize_path(file_path)))
            .into_iter()
            .filter(move |s| s.file_path == owned)
    }

    /// Most recent snapshot of a file
    pub fn latest_snapshot(&self, file_path: &str) -> Option<BlockSnapshot> {
        self.scan_file(file_path).max_by_key(|s| s.timestamp)
    }

    /// Most recent snapshot of a file taken at or before `timestamp`
    pub fn latest_snapshot_before(
        &self,
        file_path: &str,
        timestamp: DateTime<Utc>,
    ) -> Option<BlockSnapshot> {
        self.scan_file(file_path)
            .filter(|s| s.timestamp <= timestamp)
            .max_by_key(|s| s.timestamp)
    }

    /// Most recent snapshot of a file taken strictly before `timestamp`
    pub fn previous_snapshot(
        &self,
        file_path: &str,
        timestamp: DateTime<Utc>,
    ) -> Option<BlockSnapshot> {
        self.scan_file(file_path)
            .filter(|s| s.timestamp < timestamp)
            .max_by_key(|s| s.timestamp)
    }

    /// All snapshots of a file, newest first
    pub fn snapshots_for(&self, file_path: &str) -> Vec<BlockSnapshot> {
        let mut snapshots: Vec<BlockSnapshot> = self.scan_file(file_path).collect();
        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        snapshots
    }

    pub fn has_snapshots(&self, file_path: &str) -> bool {
        self.scan_file(file_path).next().is_some()
    }

    /// Snapshots of any file whose timestamp lies within `window` of `timestamp`,
    /// ordered by file path
    pub fn snapshots_near(&self, timestamp: DateTime<Utc>, window: Duration) -> Vec<BlockSnapshot> {
        let mut snapshots: Vec<BlockSnapshot> = self
            .scan(None)
            .into_iter()
            .filter(|s| (s.timestamp - timestamp).num_seconds().abs() <= window.num_seconds())
            .collect();
        snapshots.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });
        snapshots
    }

    /// Every file path that has at least one snapshot, sorted
    pub fn tracked_files(&self) -> Vec<String> {
        self.scan(None)
            .into_iter()
            .map(|s| s.file_path)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Resolve a snapshot's block contents from the blob store.
    ///
    /// Fails with `MissingBlob` on the first absent content hash; no partial
    /// result is returned.
    pub fn blocks_of(&self, snapshot: &BlockSnapshot) -> Result<Vec<Block>, StorageError> {
        snapshot
            .blocks
            .iter()
            .map(|state| {
                let content = self.objects.get_text(&state.content_hash)?.ok_or_else(|| {
                    StorageError::MissingBlob {
                        hash: state.content_hash.clone(),
                        block_id: state.id.clone(),
                    }
                })?;
                Ok(state.to_block(content))
            })
            .collect()
    }

    /// Blocks of `file_path` as of `timestamp`, or `None` when no snapshot qualifies
    pub fn blocks_at(
        &self,
        file_path: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<Vec<Block>>, StorageError> {
        match self.latest_snapshot_before(file_path, timestamp) {
            Some(snapshot) => self.blocks_of(&snapshot).map(Some),
            None => Ok(None),
        }
    }

    /// Rebuild a `ParsedFile` from a snapshot, including its front matter
    pub fn parsed_file_of(&self, snapshot: &BlockSnapshot) -> Result<ParsedFile, StorageError> {
        Ok(ParsedFile {
            path: snapshot.file_path.clone(),
            front_matter: snapshot.front_matter.clone(),
            blocks: self.blocks_of(snapshot)?,
        })
    }
}
