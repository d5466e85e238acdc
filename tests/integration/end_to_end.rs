use super::{hour, init_workspace, object_count};
use notevc::workspace::CommitOutcome;
use notevc::{ApiError, Repository};
use std::fs;

const NOTE: &str = "# Groceries\n- milk\n- bread\n\n## Later\nvisit the market\n";

#[test]
fn init_writes_empty_metadata_and_timeline() {
    let (_temp, ws) = init_workspace();
    let repo = ws.repository();

    let metadata: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(repo.metadata_path()).unwrap()).unwrap();
    assert!(metadata["head"].is_null());
    assert_eq!(metadata["version"], env!("CARGO_PKG_VERSION"));
    assert!(metadata["config"]["maxSnapshots"].is_number());
    assert_eq!(fs::read_to_string(repo.timeline_path()).unwrap(), "[]");
}

#[test]
fn commit_recommit_restore_cycle() {
    let (temp, ws) = init_workspace();
    let note = temp.path().join("note.md");
    fs::write(&note, NOTE).unwrap();

    let outcome = ws.commit_all_at("first", hour(9)).unwrap();
    let first = outcome.commit().unwrap().clone();

    assert_eq!(ws.timeline().entries().unwrap().len(), 1);
    let snapshots = ws.snapshots().snapshots_for("note.md");
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].blocks.len(), 2);
    assert!(object_count(&ws) <= 2);

    // No edits: nothing new is written anywhere
    let objects_before = object_count(&ws);
    assert_eq!(
        ws.commit_all_at("again", hour(10)).unwrap(),
        CommitOutcome::NoChanges
    );
    assert_eq!(ws.timeline().entries().unwrap().len(), 1);
    assert_eq!(ws.snapshots().snapshots_for("note.md").len(), 1);
    assert_eq!(object_count(&ws), objects_before);

    fs::write(&note, "# Groceries\n- nothing\n").unwrap();
    ws.commit_all_at("second", hour(11)).unwrap();

    ws.restore_file(&first.hash, "note.md").unwrap();
    assert_eq!(fs::read(&note).unwrap(), NOTE.as_bytes());

    let metadata = ws.repository().metadata().unwrap();
    assert_eq!(metadata.last_commit.unwrap().message, "second");
}

#[test]
fn discover_from_nested_directory() {
    let (temp, _ws) = init_workspace();
    let nested = temp.path().join("journal").join("2024");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("jan.md"), "# January\n").unwrap();

    let ws = notevc::Workspace::discover(&nested).unwrap();
    let outcome = ws.commit_file_at("journal/2024/jan.md", "jan", hour(8)).unwrap();
    assert!(outcome.commit().is_some());
    assert!(ws.snapshots().has_snapshots("journal/2024/jan.md"));
}

#[test]
fn operations_outside_repository_fail() {
    let temp = tempfile::TempDir::new().unwrap();
    assert!(matches!(
        notevc::Workspace::discover(temp.path()),
        Err(ApiError::NotARepository(_))
    ));
    let repo = Repository::at(temp.path()).unwrap();
    assert!(matches!(
        notevc::Workspace::open(repo),
        Err(ApiError::NotARepository(_))
    ));
}
