//! Restore: write committed content back into the working copy.

use super::commit_window;
use super::types::{RestoreReport, RestoredFile};
use super::Workspace;
use crate::error::ApiError;
use crate::parser::ParsedFile;
use crate::snapshot::BlockSnapshot;
use std::collections::BTreeMap;

impl Workspace {
    /// Rewrite `file` as it was at `commit`, front matter included.
    pub fn restore_file(&self, commit: &str, file: &str) -> Result<RestoreReport, ApiError> {
        let commit = self.resolve_commit(commit)?;
        let path = self.repo.relative_path(file);
        let snapshot = self.snapshot_at_commit(&path, &commit)?;
        let parsed = self.snapshots.parsed_file_of(&snapshot)?;
        self.write_working(&path, &parsed.reconstruct())?;

        tracing::info!(commit = %commit.hash, file = %path, "Restored file");
        Ok(RestoreReport {
            files: vec![RestoredFile {
                path,
                block_count: parsed.blocks.len(),
            }],
            commit,
            block: None,
        })
    }

    /// Replace one block of the current `file` with its content at `commit`.
    /// Every other block is left as it is in the working copy.
    pub fn restore_block(
        &self,
        commit: &str,
        file: &str,
        block: &str,
    ) -> Result<RestoreReport, ApiError> {
        let commit = self.resolve_commit(commit)?;
        let path = self.repo.relative_path(file);
        let snapshot = self.snapshot_at_commit(&path, &commit)?;
        let not_found = || ApiError::BlockNotFound {
            block: block.to_string(),
            file: path.clone(),
        };

        let state = snapshot.find_block(block).ok_or_else(not_found)?;
        let content = self.stored_content(state)?;

        let mut current = self
            .read_working(&path)?
            .ok_or_else(|| ApiError::FileNotFound(path.clone()))?;
        let target = current
            .blocks
            .iter_mut()
            .find(|b| b.id == state.id)
            .ok_or_else(not_found)?;
        target.content = content;
        self.write_working(&path, &current.reconstruct())?;

        tracing::info!(commit = %commit.hash, file = %path, block = %state.id, "Restored block");
        Ok(RestoreReport {
            files: vec![RestoredFile {
                block_count: current.blocks.len(),
                path: path.clone(),
            }],
            block: Some(state.id.clone()),
            commit,
        })
    }

    /// Restore every file snapshotted by `commit`.
    ///
    /// All contents are resolved before anything is written, so a missing blob
    /// leaves the working copy untouched.
    pub fn restore_all(&self, commit: &str) -> Result<RestoreReport, ApiError> {
        let commit = self.resolve_commit(commit)?;

        // One snapshot per file: the one closest to the commit time
        let mut chosen: BTreeMap<String, BlockSnapshot> = BTreeMap::new();
        for snapshot in self.snapshots.snapshots_near(commit.timestamp, commit_window()) {
            let distance = (snapshot.timestamp - commit.timestamp).num_seconds().abs();
            let closer = chosen.get(&snapshot.file_path).map_or(true, |current| {
                distance <= (current.timestamp - commit.timestamp).num_seconds().abs()
            });
            if closer {
                chosen.insert(snapshot.file_path.clone(), snapshot);
            }
        }
        if chosen.is_empty() {
            return Err(ApiError::SnapshotNotFound {
                file: "*".to_string(),
                commit: commit.hash.clone(),
            });
        }

        let parsed: Vec<ParsedFile> = chosen
            .values()
            .map(|s| self.snapshots.parsed_file_of(s))
            .collect::<Result<_, _>>()?;

        let mut files = Vec::with_capacity(parsed.len());
        for file in parsed {
            self.write_working(&file.path, &file.reconstruct())?;
            files.push(RestoredFile {
                block_count: file.blocks.len(),
                path: file.path,
            });
        }

        tracing::info!(commit = %commit.hash, files = files.len(), "Restored commit");
        Ok(RestoreReport {
            commit,
            files,
            block: None,
        })
    }
}
