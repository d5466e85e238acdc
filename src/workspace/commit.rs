//! Commit: snapshot changed notes and append a timeline entry.

use super::types::{CommitOutcome, CommitReport, CommittedFile};
use super::{is_markdown, Workspace};
use crate::error::ApiError;
use crate::hasher::compute_commit_hash;
use crate::parser::ParsedFile;
use crate::snapshot::{compare_blocks, BlockChange, BlockSnapshot};
use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp text hashed into a commit id, as written to `timeline.json`
fn commit_time_text(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl Workspace {
    /// Commit every enabled Markdown file that changed since its latest snapshot.
    pub fn commit_all(&self, message: &str) -> Result<CommitOutcome, ApiError> {
        self.commit_all_at(message, Utc::now())
    }

    /// `commit_all` with an explicit commit time
    pub fn commit_all_at(
        &self,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<CommitOutcome, ApiError> {
        let files = self.working_files();
        if files.is_empty() {
            return Err(ApiError::NoMarkdownFiles);
        }

        let mut pending = Vec::new();
        let mut skipped = Vec::new();
        for path in files {
            let Some(parsed) = self.read_working(&path)? else {
                continue;
            };
            if !parsed.is_enabled() {
                tracing::debug!(file = %path, "Skipping disabled file");
                skipped.push(path);
                continue;
            }
            if let Some(changes) = self.pending_changes(&parsed, timestamp) {
                pending.push((parsed, changes));
            }
        }

        if pending.is_empty() {
            tracing::info!("No changes to commit");
            return Ok(CommitOutcome::NoChanges);
        }
        self.write_commit(message, timestamp, None, pending, skipped)
    }

    /// Commit a single file
    pub fn commit_file(&self, file: &str, message: &str) -> Result<CommitOutcome, ApiError> {
        self.commit_file_at(file, message, Utc::now())
    }

    /// `commit_file` with an explicit commit time
    pub fn commit_file_at(
        &self,
        file: &str,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<CommitOutcome, ApiError> {
        let path = self.repo.relative_path(file);
        if !self.repo.root().join(&path).is_file() {
            return Err(ApiError::FileNotFound(path));
        }
        if !is_markdown(&path) {
            return Err(ApiError::UnsupportedFileType(path));
        }
        let parsed = self
            .read_working(&path)?
            .ok_or_else(|| ApiError::FileNotFound(path.clone()))?;
        if !parsed.is_enabled() {
            return Err(ApiError::FileDisabled(path));
        }

        match self.pending_changes(&parsed, timestamp) {
            Some(changes) => self.write_commit(
                message,
                timestamp,
                Some(&path),
                vec![(parsed, changes)],
                Vec::new(),
            ),
            None => {
                tracing::info!(file = %path, "No changes to commit");
                Ok(CommitOutcome::NoChanges)
            }
        }
    }

    /// Block changes against the latest snapshot, or `None` when the file is
    /// already tracked and unchanged. A never-snapshotted file always counts.
    fn pending_changes(
        &self,
        parsed: &ParsedFile,
        timestamp: DateTime<Utc>,
    ) -> Option<Vec<BlockChange>> {
        let current = BlockSnapshot::from_parsed(parsed, timestamp);
        match self.snapshots.latest_snapshot(&parsed.path) {
            None => Some(compare_blocks(None, Some(&current))),
            Some(latest) => {
                let changes = compare_blocks(Some(&latest), Some(&current));
                (!changes.is_empty()).then_some(changes)
            }
        }
    }

    /// A new commit must be strictly newer than the head and have a hash not
    /// already in the timeline.
    fn check_commit_order(&self, timestamp: DateTime<Utc>, hash: &str) -> Result<(), ApiError> {
        if let Some(head) = self.timeline.head_entry()? {
            if timestamp <= head.timestamp {
                return Err(ApiError::InvalidArgument(format!(
                    "commit time {} is not after head {} ({})",
                    commit_time_text(timestamp),
                    head.hash,
                    commit_time_text(head.timestamp)
                )));
            }
        }
        if self.timeline.get(hash)?.is_some() {
            return Err(ApiError::InvalidArgument(format!(
                "commit {} already exists",
                hash
            )));
        }
        Ok(())
    }

    fn write_commit(
        &self,
        message: &str,
        timestamp: DateTime<Utc>,
        single_file: Option<&str>,
        pending: Vec<(ParsedFile, Vec<BlockChange>)>,
        skipped: Vec<String>,
    ) -> Result<CommitOutcome, ApiError> {
        let hash = compute_commit_hash(&commit_time_text(timestamp), message, single_file);
        self.check_commit_order(timestamp, &hash)?;

        let mut files = Vec::with_capacity(pending.len());
        for (parsed, changes) in pending {
            let snapshot = self.snapshots.store_blocks(&parsed, timestamp)?;
            files.push(CommittedFile {
                path: snapshot.file_path,
                block_count: snapshot.blocks.len(),
                changes,
            });
        }

        let author = self.repo.config().author_name();
        let commit = self.timeline.append(message, &author, timestamp, hash)?;
        self.repo.update_head(&commit)?;

        tracing::info!(
            commit = %commit.hash,
            files = files.len(),
            "Created commit"
        );
        Ok(CommitOutcome::Committed(CommitReport {
            commit,
            files,
            skipped,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repository;
    use crate::snapshot::BlockChangeType;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::at(temp.path()).unwrap();
        repo.init().unwrap();
        let workspace = Workspace::open(repo).unwrap();
        (temp, workspace)
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
    }

    fn committed(outcome: CommitOutcome) -> CommitReport {
        match outcome {
            CommitOutcome::Committed(report) => report,
            CommitOutcome::NoChanges => panic!("expected a commit"),
        }
    }

    #[test]
    fn test_open_requires_init() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::at(temp.path()).unwrap();
        assert!(matches!(Workspace::open(repo), Err(ApiError::NotARepository(_))));
    }

    #[test]
    fn test_commit_all_without_files() {
        let (_temp, ws) = setup();
        assert!(matches!(ws.commit_all("empty"), Err(ApiError::NoMarkdownFiles)));
    }

    #[test]
    fn test_commit_all_then_no_changes() {
        let (temp, ws) = setup();
        fs::write(temp.path().join("note.md"), "# A\none\n# B\ntwo\n").unwrap();

        let report = committed(ws.commit_all_at("first", at(1)).unwrap());
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].block_count, 2);
        assert!(report.files[0]
            .changes
            .iter()
            .all(|c| c.change_type == BlockChangeType::Added));
        assert_eq!(
            report.commit.hash,
            compute_commit_hash("2024-06-01T01:00:00Z", "first", None)
        );

        assert_eq!(ws.commit_all_at("again", at(2)).unwrap(), CommitOutcome::NoChanges);
        assert_eq!(ws.timeline().entries().unwrap().len(), 1);

        let metadata = ws.repository().metadata().unwrap();
        assert_eq!(metadata.head, Some(report.commit.hash.clone()));
    }

    #[test]
    fn test_commit_all_only_snapshots_changed_files() {
        let (temp, ws) = setup();
        fs::write(temp.path().join("a.md"), "# A\n").unwrap();
        fs::write(temp.path().join("b.md"), "# B\n").unwrap();
        committed(ws.commit_all_at("first", at(1)).unwrap());

        fs::write(temp.path().join("b.md"), "# B\nedited\n").unwrap();
        let report = committed(ws.commit_all_at("second", at(2)).unwrap());
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].path, "b.md");
        assert_eq!(report.files[0].changes[0].change_type, BlockChangeType::Modified);
        let entries = ws.timeline().entries().unwrap();
        assert_eq!(report.commit.parent.as_ref(), Some(&entries[1].hash));
    }

    #[test]
    fn test_disabled_files_are_skipped() {
        let (temp, ws) = setup();
        fs::write(temp.path().join("draft.md"), "---\nenabled: false\n---\n# D\n").unwrap();
        fs::write(temp.path().join("note.md"), "# N\n").unwrap();

        let report = committed(ws.commit_all_at("first", at(1)).unwrap());
        assert_eq!(report.skipped, vec!["draft.md"]);
        assert_eq!(report.files.len(), 1);
        assert!(!ws.snapshots().has_snapshots("draft.md"));

        assert!(matches!(
            ws.commit_file_at("draft.md", "x", at(2)),
            Err(ApiError::FileDisabled(_))
        ));
    }

    #[test]
    fn test_commit_file_errors() {
        let (temp, ws) = setup();
        fs::write(temp.path().join("notes.txt"), "text").unwrap();

        assert!(matches!(
            ws.commit_file("missing.md", "x"),
            Err(ApiError::FileNotFound(_))
        ));
        assert!(matches!(
            ws.commit_file("notes.txt", "x"),
            Err(ApiError::UnsupportedFileType(_))
        ));

        fs::write(temp.path().join("image.png"), [0x89, 0x50, 0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            ws.commit_file("image.png", "x"),
            Err(ApiError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_commit_hash_uses_persisted_timestamp_text() {
        let (temp, ws) = setup();
        fs::write(temp.path().join("note.md"), "# N\n").unwrap();
        let report = committed(ws.commit_all_at("first", at(1)).unwrap());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(ws.timeline().path()).unwrap()).unwrap();
        let stored = json[0]["timestamp"].as_str().unwrap();
        assert_eq!(stored, "2024-06-01T01:00:00Z");
        assert_eq!(report.commit.hash, compute_commit_hash(stored, "first", None));
    }

    #[test]
    fn test_commit_at_same_time_as_head_is_rejected() {
        let (temp, ws) = setup();
        fs::write(temp.path().join("note.md"), "# N\n").unwrap();
        committed(ws.commit_all_at("m", at(1)).unwrap());

        fs::write(temp.path().join("note.md"), "# N\nedited\n").unwrap();
        assert!(matches!(
            ws.commit_all_at("m", at(1)),
            Err(ApiError::InvalidArgument(_))
        ));
        assert_eq!(ws.timeline().entries().unwrap().len(), 1);
        ws.timeline().verify().unwrap();
    }

    #[test]
    fn test_commit_older_than_head_is_rejected() {
        let (temp, ws) = setup();
        fs::write(temp.path().join("note.md"), "# N\n").unwrap();
        committed(ws.commit_all_at("first", at(5)).unwrap());

        fs::write(temp.path().join("note.md"), "# N\nedited\n").unwrap();
        assert!(matches!(
            ws.commit_file_at("note.md", "earlier", at(4)),
            Err(ApiError::InvalidArgument(_))
        ));
        assert_eq!(ws.snapshots().snapshots_for("note.md").len(), 1);

        committed(ws.commit_all_at("later", at(6)).unwrap());
        ws.timeline().verify().unwrap();
    }

    #[test]
    fn test_commit_file_hash_includes_path() {
        let (temp, ws) = setup();
        fs::create_dir(temp.path().join("daily")).unwrap();
        fs::write(temp.path().join("daily/log.md"), "# Log\n").unwrap();
        fs::write(temp.path().join("other.md"), "# Other\n").unwrap();

        let report = committed(ws.commit_file_at("daily/log.md", "log", at(1)).unwrap());
        assert_eq!(
            report.commit.hash,
            compute_commit_hash("2024-06-01T01:00:00Z", "log", Some("daily/log.md"))
        );
        assert_eq!(report.files.len(), 1);
        assert!(!ws.snapshots().has_snapshots("other.md"));

        assert_eq!(
            ws.commit_file_at("daily/log.md", "again", at(2)).unwrap(),
            CommitOutcome::NoChanges
        );
    }

    #[test]
    fn test_configured_author_is_recorded() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::at(temp.path()).unwrap();
        repo.init().unwrap();
        fs::write(
            temp.path().join(".notevc/config.toml"),
            "author = \"Ana Lima\"\n",
        )
        .unwrap();
        let ws = Workspace::open(Repository::at(temp.path()).unwrap()).unwrap();
        fs::write(temp.path().join("note.md"), "# N\n").unwrap();

        let report = committed(ws.commit_all_at("first", at(1)).unwrap());
        assert_eq!(report.commit.author, "Ana Lima");
    }
}
