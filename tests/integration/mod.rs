//! Integration tests for notevc repositories, driven through the public API

mod end_to_end;
mod history_flow;
mod storage_layout;

use chrono::{DateTime, TimeZone, Utc};
use notevc::{Repository, Workspace};
use tempfile::TempDir;

/// A fresh, initialized repository in a temp dir
pub fn init_workspace() -> (TempDir, Workspace) {
    let temp = TempDir::new().unwrap();
    let repo = Repository::at(temp.path()).unwrap();
    repo.init().unwrap();
    let workspace = Workspace::open(repo).unwrap();
    (temp, workspace)
}

/// Fixed commit times, an hour apart so commit windows never overlap
pub fn hour(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 10, h, 0, 0).unwrap()
}

/// Number of blob files under `.notevc/objects`
pub fn object_count(workspace: &Workspace) -> usize {
    walkdir::WalkDir::new(workspace.repository().objects_dir())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count()
}
