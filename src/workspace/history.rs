//! Log and show: reading history back out of the timeline.
//!
//! Snapshots are tied to commits by time alone. A commit's files are the
//! snapshots taken within the commit window of its timestamp.

use super::commit_window;
use super::types::{BlockContent, CommitDetails, CommitStats, LogEntry, LogFileEntry, LogOptions};
use super::Workspace;
use crate::error::{ApiError, StorageError};
use crate::snapshot::{compare_blocks, BlockSnapshot};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeSet;

/// Parse a `--since` style value: `<n>h`, `<n>d`, `<n>w` relative to `now`,
/// an RFC 3339 instant, or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_since(spec: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ApiError> {
    let spec = spec.trim();
    let invalid = || ApiError::InvalidArgument(format!("unrecognized time: {}", spec));

    if let Some(unit) = spec.chars().last() {
        let amount = &spec[..spec.len() - unit.len_utf8()];
        if let Ok(n) = amount.parse::<i64>() {
            let delta = match unit {
                'h' => Duration::try_hours(n),
                'd' => Duration::try_days(n),
                'w' => Duration::try_weeks(n),
                _ => return Err(invalid()),
            };
            return delta
                .and_then(|d| now.checked_sub_signed(d))
                .ok_or_else(invalid);
        }
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(spec) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(spec, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(invalid)
}

impl Workspace {
    /// Commits newest first, filtered by `options`.
    pub fn log(&self, options: &LogOptions) -> Result<Vec<LogEntry>, ApiError> {
        let file = options.file.as_deref().map(|f| self.repo.relative_path(f));
        let mut entries = Vec::new();

        for commit in self.timeline.entries()? {
            if options.max_count.is_some_and(|max| entries.len() >= max) {
                break;
            }
            if options.since.is_some_and(|since| commit.timestamp < since) {
                continue;
            }

            let snapshots = self
                .snapshots
                .snapshots_near(commit.timestamp, commit_window());
            if let Some(file) = &file {
                if !snapshots.iter().any(|s| &s.file_path == file) {
                    continue;
                }
            }

            let files = snapshots.iter().map(|s| self.log_file_entry(s)).collect();
            entries.push(LogEntry { commit, files });
        }
        Ok(entries)
    }

    fn log_file_entry(&self, snapshot: &BlockSnapshot) -> LogFileEntry {
        let previous = self
            .snapshots
            .previous_snapshot(&snapshot.file_path, snapshot.timestamp);
        LogFileEntry {
            path: snapshot.file_path.clone(),
            block_count: snapshot.blocks.len(),
            stats: CommitStats::from_changes(&compare_blocks(previous.as_ref(), Some(snapshot))),
        }
    }

    /// A commit compared with its parent, optionally restricted to one file.
    pub fn show(&self, commit: &str, file: Option<&str>) -> Result<CommitDetails, ApiError> {
        let commit = self.resolve_commit(commit)?;
        let parent = self.timeline.parent_of(&commit)?;

        let paths: BTreeSet<String> = match file {
            Some(f) => BTreeSet::from([self.repo.relative_path(f)]),
            None => self
                .snapshots
                .snapshots_near(commit.timestamp, commit_window())
                .into_iter()
                .map(|s| s.file_path)
                .collect(),
        };

        let mut files = Vec::new();
        let mut stats = CommitStats::default();
        for path in paths {
            let old = parent
                .as_ref()
                .and_then(|p| self.snapshots.latest_snapshot_before(&path, p.timestamp));
            let new = self.snapshots.latest_snapshot_before(&path, commit.timestamp);
            let diff = self.file_diff(&path, old.as_ref(), new.as_ref(), None)?;
            if diff.blocks.is_empty() {
                continue;
            }
            stats.merge(diff.stats());
            files.push(diff);
        }

        Ok(CommitDetails {
            commit,
            parent,
            files,
            stats,
        })
    }

    /// Content of one block of `file` as of `commit`
    pub fn show_block(
        &self,
        commit: &str,
        file: &str,
        block: &str,
    ) -> Result<BlockContent, ApiError> {
        let commit = self.resolve_commit(commit)?;
        let path = self.repo.relative_path(file);
        let snapshot = self.snapshot_at_commit(&path, &commit)?;
        let state = snapshot
            .find_block(block)
            .ok_or_else(|| ApiError::BlockNotFound {
                block: block.to_string(),
                file: path.clone(),
            })?;
        let content = self
            .snapshots
            .objects()
            .get_text(&state.content_hash)?
            .ok_or_else(|| StorageError::MissingBlob {
                hash: state.content_hash.clone(),
                block_id: state.id.clone(),
            })?;

        Ok(BlockContent {
            block_id: state.id.clone(),
            heading: state.heading.clone(),
            content,
            path,
            commit,
        })
    }

    /// Full text of `file` as of `commit`
    pub fn file_at(&self, commit: &str, file: &str) -> Result<String, ApiError> {
        let commit = self.resolve_commit(commit)?;
        let path = self.repo.relative_path(file);
        let snapshot = self.snapshot_at_commit(&path, &commit)?;
        Ok(self.snapshots.parsed_file_of(&snapshot)?.reconstruct())
    }

    pub(super) fn snapshot_at_commit(
        &self,
        path: &str,
        commit: &crate::timeline::CommitEntry,
    ) -> Result<BlockSnapshot, ApiError> {
        self.snapshots
            .latest_snapshot_before(path, commit.timestamp)
            .ok_or_else(|| ApiError::SnapshotNotFound {
                file: path.to_string(),
                commit: commit.hash.clone(),
            })
    }
}
