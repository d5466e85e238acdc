use super::{hour, init_workspace, object_count};
use notevc::snapshot::storage::sanitize_path;
use notevc::store::BlobStore;
use std::fs;

#[test]
fn snapshot_files_are_date_partitioned() {
    let (temp, ws) = init_workspace();
    fs::create_dir(temp.path().join("daily")).unwrap();
    fs::write(temp.path().join("daily/log.md"), "# Log\n").unwrap();
    ws.commit_all_at("log", hour(14)).unwrap();

    let expected = ws
        .repository()
        .blocks_dir()
        .join("2024/02/10")
        .join(format!("blocks-14-00-00-{}.json", sanitize_path("daily/log.md")));
    assert!(expected.is_file());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(expected).unwrap()).unwrap();
    assert_eq!(json["filePath"], "daily/log.md");
    assert_eq!(json["blocks"][0]["type"], "HEADING_SECTION");
}

#[test]
fn identical_blocks_share_one_object() {
    let (temp, ws) = init_workspace();
    let body = "# Same\n".to_string() + &"repeated text ".repeat(20);
    fs::write(temp.path().join("a.md"), &body).unwrap();
    fs::write(temp.path().join("b.md"), &body).unwrap();
    ws.commit_all_at("dup", hour(1)).unwrap();

    // Block ids differ (paths differ) but the content is stored once
    assert_eq!(object_count(&ws), 1);

    let snapshot = ws.snapshots().latest_snapshot("a.md").unwrap();
    let objects = ws.repository().object_store();
    assert_eq!(
        objects.get_text(&snapshot.blocks[0].content_hash).unwrap().unwrap(),
        body
    );
}
