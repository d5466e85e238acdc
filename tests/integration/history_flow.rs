use super::{hour, init_workspace};
use notevc::snapshot::BlockChangeType;
use notevc::workspace::{FileStatusType, LogOptions};
use std::fs;

#[test]
fn status_log_show_and_diff_agree() {
    let (temp, ws) = init_workspace();
    let root = temp.path();
    fs::write(root.join("plan.md"), "Intro text\n# Goals\nship\n# Risks\nnone\n").unwrap();
    let first = ws.commit_all_at("plan", hour(1)).unwrap().commit().unwrap().clone();

    fs::write(root.join("plan.md"), "Intro text\n# Goals\nship v2\n").unwrap();
    fs::write(root.join("ideas.md"), "# Idea\n").unwrap();

    let status = ws.status().unwrap();
    let kinds: Vec<(&str, FileStatusType)> = status
        .files
        .iter()
        .map(|f| (f.path.as_str(), f.status))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("ideas.md", FileStatusType::Untracked),
            ("plan.md", FileStatusType::Modified),
        ]
    );

    let working = ws.diff_working(Some("plan.md")).unwrap();
    let changes: Vec<BlockChangeType> = working[0].changes().map(|c| c.change_type).collect();
    assert_eq!(changes, vec![BlockChangeType::Modified, BlockChangeType::Deleted]);

    let second = ws.commit_all_at("revise", hour(2)).unwrap().commit().unwrap().clone();
    assert_eq!(second.parent.as_deref(), Some(first.hash.as_str()));
    assert!(ws.status().unwrap().is_clean());

    let details = ws.show(&second.hash, None).unwrap();
    let paths: Vec<&str> = details.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["ideas.md", "plan.md"]);
    assert_eq!(details.stats.added, 1);
    assert_eq!(details.stats.modified, 1);
    assert_eq!(details.stats.deleted, 1);

    let between = ws.diff_commits(&first.hash, &second.hash, Some("plan.md")).unwrap();
    assert_eq!(between[0].stats(), details.files[1].stats());

    let log = ws
        .log(&LogOptions {
            file: Some("ideas.md".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].commit.hash, second.hash);

    ws.timeline().verify().unwrap();
}

#[test]
fn disabled_notes_stay_out_of_history() {
    let (temp, ws) = init_workspace();
    let root = temp.path();
    fs::write(root.join("private.md"), "---\nenabled: false\n---\n# Secret\n").unwrap();
    fs::write(root.join("public.md"), "# Hello\n").unwrap();

    ws.commit_all_at("first", hour(3)).unwrap();
    assert_eq!(ws.snapshots().tracked_files(), vec!["public.md"]);
    assert!(ws.status().unwrap().is_clean());
}
