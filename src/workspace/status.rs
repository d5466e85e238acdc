//! Status: working copy against the latest snapshots.

use super::types::{FileStatus, FileStatusType, RepositoryStatus};
use super::Workspace;
use crate::error::ApiError;
use crate::snapshot::{compare_blocks, BlockSnapshot};
use chrono::Utc;
use std::collections::BTreeSet;

impl Workspace {
    /// Modified, deleted and untracked notes, sorted by path.
    pub fn status(&self) -> Result<RepositoryStatus, ApiError> {
        let now = Utc::now();
        let tracked: BTreeSet<String> = self.snapshots.tracked_files().into_iter().collect();
        let mut files = Vec::new();

        for path in &tracked {
            let Some(parsed) = self.read_working(path)? else {
                files.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Deleted,
                    changes: Vec::new(),
                    block_count: None,
                });
                continue;
            };
            if !parsed.is_enabled() {
                continue;
            }
            let latest = self.snapshots.latest_snapshot(path);
            let current = BlockSnapshot::from_parsed(&parsed, now);
            let changes = compare_blocks(latest.as_ref(), Some(&current));
            if !changes.is_empty() {
                files.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Modified,
                    changes,
                    block_count: None,
                });
            }
        }

        for path in self.working_files() {
            if tracked.contains(&path) {
                continue;
            }
            let Some(parsed) = self.read_working(&path)? else {
                continue;
            };
            if !parsed.is_enabled() {
                continue;
            }
            files.push(FileStatus {
                block_count: Some(parsed.blocks.len()),
                path,
                status: FileStatusType::Untracked,
                changes: Vec::new(),
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(RepositoryStatus { files })
    }
}
