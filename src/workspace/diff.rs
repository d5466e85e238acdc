//! Diff: block changes between working copy, commits and snapshots, with
//! rendered line diffs.

use super::types::{BlockDiff, FileDiff};
use super::Workspace;
use crate::error::{ApiError, StorageError};
use crate::parser::ParsedFile;
use crate::snapshot::{compare_blocks, line_diff, BlockSnapshot, BlockState, LineDiff};
use chrono::Utc;
use std::collections::BTreeSet;

/// Leading lines shown for added or deleted blocks
const PREVIEW_LINES: usize = 5;

impl Workspace {
    /// Working copy against the latest snapshot of each tracked file, or of
    /// `file` alone. Files without changes are omitted.
    pub fn diff_working(&self, file: Option<&str>) -> Result<Vec<FileDiff>, ApiError> {
        let now = Utc::now();
        let mut diffs = Vec::new();
        for path in self.diff_paths(file) {
            let working = self.read_working(&path)?;
            if working.as_ref().is_some_and(|w| !w.is_enabled()) {
                continue;
            }
            let old = self.snapshots.latest_snapshot(&path);
            let new = working.as_ref().map(|w| BlockSnapshot::from_parsed(w, now));
            let diff = self.file_diff(&path, old.as_ref(), new.as_ref(), working.as_ref())?;
            if !diff.blocks.is_empty() {
                diffs.push(diff);
            }
        }
        Ok(diffs)
    }

    /// Working copy against the files as of `commit`
    pub fn diff_commit(
        &self,
        commit: &str,
        file: Option<&str>,
    ) -> Result<Vec<FileDiff>, ApiError> {
        let commit = self.resolve_commit(commit)?;
        let now = Utc::now();
        let mut diffs = Vec::new();
        for path in self.diff_paths(file) {
            let working = self.read_working(&path)?;
            let old = self.snapshots.latest_snapshot_before(&path, commit.timestamp);
            let new = working.as_ref().map(|w| BlockSnapshot::from_parsed(w, now));
            let diff = self.file_diff(&path, old.as_ref(), new.as_ref(), working.as_ref())?;
            if !diff.blocks.is_empty() {
                diffs.push(diff);
            }
        }
        Ok(diffs)
    }

    /// Files as of commit `from` against files as of commit `to`
    pub fn diff_commits(
        &self,
        from: &str,
        to: &str,
        file: Option<&str>,
    ) -> Result<Vec<FileDiff>, ApiError> {
        let from = self.resolve_commit(from)?;
        let to = self.resolve_commit(to)?;
        let mut diffs = Vec::new();
        for path in self.diff_paths(file) {
            let old = self.snapshots.latest_snapshot_before(&path, from.timestamp);
            let new = self.snapshots.latest_snapshot_before(&path, to.timestamp);
            let diff = self.file_diff(&path, old.as_ref(), new.as_ref(), None)?;
            if !diff.blocks.is_empty() {
                diffs.push(diff);
            }
        }
        Ok(diffs)
    }

    /// One block of the working copy against `commit` (or the latest
    /// snapshot). `Ok(None)` means the block is unchanged.
    pub fn diff_block(
        &self,
        commit: Option<&str>,
        file: &str,
        block: &str,
    ) -> Result<Option<BlockDiff>, ApiError> {
        let path = self.repo.relative_path(file);
        let old_snapshot = match commit {
            Some(prefix) => {
                let commit = self.resolve_commit(prefix)?;
                Some(self.snapshot_at_commit(&path, &commit)?)
            }
            None => self.snapshots.latest_snapshot(&path),
        };
        let working = self.read_working(&path)?;
        let new_snapshot = working
            .as_ref()
            .map(|w| BlockSnapshot::from_parsed(w, Utc::now()));

        let old_state = old_snapshot.as_ref().and_then(|s| s.find_block(block));
        let id = old_state.map(|s| s.id.as_str()).unwrap_or(block);
        let new_state = new_snapshot.as_ref().and_then(|s| s.find_block(id));
        if old_state.is_none() && new_state.is_none() {
            return Err(ApiError::BlockNotFound {
                block: block.to_string(),
                file: path,
            });
        }

        let old_one = single_block(&path, old_state);
        let new_one = single_block(&path, new_state);
        match compare_blocks(old_one.as_ref(), new_one.as_ref()).into_iter().next() {
            Some(change) => Ok(Some(BlockDiff {
                lines: self.render_lines(old_state, new_state, working.as_ref())?,
                change,
            })),
            None => Ok(None),
        }
    }

    /// `file` alone, or every tracked file
    fn diff_paths(&self, file: Option<&str>) -> BTreeSet<String> {
        match file {
            Some(f) => BTreeSet::from([self.repo.relative_path(f)]),
            None => self.snapshots.tracked_files().into_iter().collect(),
        }
    }

    /// Block changes between two states of `path`. New-side content comes
    /// from `working` when given, otherwise from the blob store.
    pub(super) fn file_diff(
        &self,
        path: &str,
        old: Option<&BlockSnapshot>,
        new: Option<&BlockSnapshot>,
        working: Option<&ParsedFile>,
    ) -> Result<FileDiff, ApiError> {
        let mut blocks = Vec::new();
        for change in compare_blocks(old, new) {
            let old_state = old.and_then(|s| s.find_block(&change.block_id));
            let new_state = new.and_then(|s| s.find_block(&change.block_id));
            blocks.push(BlockDiff {
                lines: self.render_lines(old_state, new_state, working)?,
                change,
            });
        }
        Ok(FileDiff {
            path: path.to_string(),
            blocks,
        })
    }

    fn render_lines(
        &self,
        old: Option<&BlockState>,
        new: Option<&BlockState>,
        working: Option<&ParsedFile>,
    ) -> Result<LineDiff, ApiError> {
        let diff = match (old, new) {
            (Some(o), Some(n)) => line_diff(
                &self.stored_content(o)?,
                &self.new_content(n, working)?,
            ),
            (None, Some(n)) => LineDiff::added(&self.new_content(n, working)?, PREVIEW_LINES),
            (Some(o), None) => LineDiff::removed(&self.stored_content(o)?, PREVIEW_LINES),
            (None, None) => LineDiff::default(),
        };
        Ok(diff)
    }

    fn new_content(
        &self,
        state: &BlockState,
        working: Option<&ParsedFile>,
    ) -> Result<String, ApiError> {
        match working.and_then(|w| w.blocks.iter().find(|b| b.id == state.id)) {
            Some(block) => Ok(block.content.clone()),
            None => self.stored_content(state),
        }
    }

    pub(super) fn stored_content(&self, state: &BlockState) -> Result<String, ApiError> {
        let content = self
            .snapshots
            .objects()
            .get_text(&state.content_hash)?
            .ok_or_else(|| StorageError::MissingBlob {
                hash: state.content_hash.clone(),
                block_id: state.id.clone(),
            })?;
        Ok(content)
    }
}

fn single_block(path: &str, state: Option<&BlockState>) -> Option<BlockSnapshot> {
    state.map(|s| BlockSnapshot {
        file_path: path.to_string(),
        timestamp: Utc::now(),
        blocks: vec![s.clone()],
        front_matter: None,
    })
}
