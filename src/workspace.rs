//! Workspace domain: history operations over an initialized repository.
//!
//! Each operation composes the blob store, snapshot store and timeline and
//! returns structured values; nothing here formats for display.

mod commit;
mod diff;
mod files;
mod history;
mod restore;
mod status;
mod types;

pub use files::{is_markdown, markdown_files};
pub use history::parse_since;
pub use types::*;

use crate::error::ApiError;
use crate::parser::{parse, ParsedFile};
use crate::repository::Repository;
use crate::snapshot::SnapshotStore;
use crate::timeline::{CommitEntry, Timeline};
use std::fs;
use std::path::Path;

/// Snapshots within this distance of a commit belong to it
fn commit_window() -> chrono::Duration {
    chrono::Duration::seconds(crate::types::COMMIT_WINDOW_SECS)
}

/// An initialized repository with its stores opened
pub struct Workspace {
    repo: Repository,
    snapshots: SnapshotStore,
    timeline: Timeline,
}

impl Workspace {
    /// Open an initialized repository
    pub fn open(repo: Repository) -> Result<Self, ApiError> {
        repo.require_initialized()?;
        Ok(Self {
            snapshots: repo.snapshot_store(),
            timeline: repo.timeline(),
            repo,
        })
    }

    /// Open the repository containing `dir`
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ApiError> {
        Self::open(Repository::find_from(dir)?)
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Resolve a commit hash prefix
    pub fn resolve_commit(&self, prefix: &str) -> Result<CommitEntry, ApiError> {
        self.timeline
            .find(prefix)?
            .ok_or_else(|| ApiError::CommitNotFound(prefix.to_string()))
    }

    /// Markdown files in the working copy
    pub fn working_files(&self) -> Vec<String> {
        markdown_files(self.repo.root())
    }

    /// Read and parse a working-copy note, or `None` when it does not exist
    fn read_working(&self, path: &str) -> Result<Option<ParsedFile>, ApiError> {
        let full = self.repo.root().join(path);
        if !full.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&full)?;
        Ok(Some(parse(&text, path)))
    }

    fn write_working(&self, path: &str, text: &str) -> Result<(), ApiError> {
        let full = self.repo.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, text)?;
        Ok(())
    }
}
