//! Result types for history operations.

use crate::snapshot::{BlockChange, BlockChangeType, LineDiff};
use crate::timeline::CommitEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a commit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// Nothing differed from the latest snapshots; no commit was written.
    NoChanges,
    Committed(CommitReport),
}

impl CommitOutcome {
    pub fn commit(&self) -> Option<&CommitEntry> {
        match self {
            CommitOutcome::NoChanges => None,
            CommitOutcome::Committed(report) => Some(&report.commit),
        }
    }
}

/// A written commit and the files it snapshotted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub commit: CommitEntry,
    pub files: Vec<CommittedFile>,
    /// Enabled-false files passed over
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedFile {
    pub path: String,
    pub block_count: usize,
    pub changes: Vec<BlockChange>,
}

/// Added/modified/deleted block totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl CommitStats {
    pub fn from_changes<'a>(changes: impl IntoIterator<Item = &'a BlockChange>) -> Self {
        let mut stats = Self::default();
        for change in changes {
            stats.record(change.change_type);
        }
        stats
    }

    pub fn record(&mut self, change_type: BlockChangeType) {
        match change_type {
            BlockChangeType::Added => self.added += 1,
            BlockChangeType::Modified => self.modified += 1,
            BlockChangeType::Deleted => self.deleted += 1,
        }
    }

    pub fn merge(&mut self, other: CommitStats) {
        self.added += other.added;
        self.modified += other.modified;
        self.deleted += other.deleted;
    }

    pub fn total(&self) -> usize {
        self.added + self.modified + self.deleted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatusType {
    Modified,
    Untracked,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub path: String,
    pub status: FileStatusType,
    /// Block changes against the latest snapshot (modified files only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<BlockChange>,
    /// Blocks in the working copy (untracked files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_count: Option<usize>,
}

/// Working copy state. Clean files are not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    pub files: Vec<FileStatus>,
}

impl RepositoryStatus {
    pub fn is_clean(&self) -> bool {
        self.files.is_empty()
    }

    pub fn of_type(&self, status: FileStatusType) -> impl Iterator<Item = &FileStatus> {
        self.files.iter().filter(move |f| f.status == status)
    }
}

/// Filters for `log`
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Only commits at or after this instant
    pub since: Option<DateTime<Utc>>,
    pub max_count: Option<usize>,
    /// Only commits that snapshotted this file
    pub file: Option<String>,
}

/// One file snapshotted by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileEntry {
    pub path: String,
    pub block_count: usize,
    /// Changes against the file's previous snapshot
    pub stats: CommitStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub commit: CommitEntry,
    pub files: Vec<LogFileEntry>,
}

/// One block change with its rendered lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDiff {
    pub change: BlockChange,
    pub lines: LineDiff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub blocks: Vec<BlockDiff>,
}

impl FileDiff {
    pub fn changes(&self) -> impl Iterator<Item = &BlockChange> {
        self.blocks.iter().map(|b| &b.change)
    }

    pub fn stats(&self) -> CommitStats {
        CommitStats::from_changes(self.changes())
    }
}

/// A commit compared with its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub commit: CommitEntry,
    pub parent: Option<CommitEntry>,
    pub files: Vec<FileDiff>,
    pub stats: CommitStats,
}

/// Content of one block as committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContent {
    pub commit: CommitEntry,
    pub path: String,
    pub block_id: String,
    pub heading: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredFile {
    pub path: String,
    pub block_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub commit: CommitEntry,
    pub files: Vec<RestoredFile>,
    /// Set when a single block was restored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
}
