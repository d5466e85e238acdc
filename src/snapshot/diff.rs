//! Diff engine
//!
//! `compare_blocks` is the identity-keyed change set used for every
//! correctness decision (commit, status). `line_diff` is a positional,
//! display-only line walk over two block bodies.

use crate::snapshot::{BlockSnapshot, BlockState};
use crate::types::{BlockID, ContentHash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of rendered lines in a line diff
pub const MAX_DIFF_LINES: usize = 15;

/// Kind of block-level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockChangeType {
    Added,
    Modified,
    Deleted,
}

/// A single block-level change between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockChange {
    pub block_id: BlockID,
    #[serde(rename = "type")]
    pub change_type: BlockChangeType,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_hash: Option<ContentHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_hash: Option<ContentHash>,
}

impl BlockChange {
    fn added(state: &BlockState) -> Self {
        Self {
            block_id: state.id.clone(),
            change_type: BlockChangeType::Added,
            heading: state.heading.clone(),
            old_hash: None,
            new_hash: Some(state.content_hash.clone()),
        }
    }

    fn modified(old: &BlockState, new: &BlockState) -> Self {
        Self {
            block_id: new.id.clone(),
            change_type: BlockChangeType::Modified,
            heading: new.heading.clone(),
            old_hash: Some(old.content_hash.clone()),
            new_hash: Some(new.content_hash.clone()),
        }
    }

    fn deleted(state: &BlockState) -> Self {
        Self {
            block_id: state.id.clone(),
            change_type: BlockChangeType::Deleted,
            heading: state.heading.clone(),
            old_hash: Some(state.content_hash.clone()),
            new_hash: None,
        }
    }
}

/// Compare two snapshots by block id.
///
/// Blocks only in `new` are `Added`, blocks in both with different content
/// hashes are `Modified`, blocks only in `old` are `Deleted`. A block whose
/// heading or position changed has a new id and therefore shows up as a
/// delete plus an add. Changes for `new` come first in its block order,
/// followed by deletions in `old`'s block order.
pub fn compare_blocks(
    old: Option<&BlockSnapshot>,
    new: Option<&BlockSnapshot>,
) -> Vec<BlockChange> {
    let old_blocks: &[BlockState] = old.map(|s| s.blocks.as_slice()).unwrap_or(&[]);
    let new_blocks: &[BlockState] = new.map(|s| s.blocks.as_slice()).unwrap_or(&[]);

    let old_by_id: HashMap<&str, &BlockState> =
        old_blocks.iter().map(|b| (b.id.as_str(), b)).collect();
    let new_by_id: HashMap<&str, &BlockState> =
        new_blocks.iter().map(|b| (b.id.as_str(), b)).collect();

    let mut changes = Vec::new();
    for new_block in new_blocks {
        match old_by_id.get(new_block.id.as_str()) {
            None => changes.push(BlockChange::added(new_block)),
            Some(old_block) if old_block.content_hash != new_block.content_hash => {
                changes.push(BlockChange::modified(old_block, new_block))
            }
            Some(_) => {}
        }
    }
    for old_block in old_blocks {
        if !new_by_id.contains_key(old_block.id.as_str()) {
            changes.push(BlockChange::deleted(old_block));
        }
    }
    changes
}

/// One rendered line of a line diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// A truncated line diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    pub lines: Vec<DiffLine>,
    /// Lines left unrendered after truncation
    pub remaining: usize,
}

impl LineDiff {
    /// Leading lines of a block that was added
    pub fn added(content: &str, max_lines: usize) -> Self {
        Self::preview(content, max_lines, DiffLine::Added)
    }

    /// Leading lines of a block that was deleted
    pub fn removed(content: &str, max_lines: usize) -> Self {
        Self::preview(content, max_lines, DiffLine::Removed)
    }

    fn preview(content: &str, max_lines: usize, make: fn(String) -> DiffLine) -> Self {
        let all: Vec<&str> = content.lines().collect();
        let shown = all.len().min(max_lines);
        Self {
            lines: all[..shown].iter().map(|l| make(l.to_string())).collect(),
            remaining: all.len() - shown,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.remaining > 0
    }
}

/// Positional line diff between two block bodies.
///
/// Walks both sides with independent cursors: equal lines are context, a
/// line on only one side is a pure add or delete, and differing lines at the
/// same position become a delete followed by an add. There is no alignment
/// step. Output stops once `MAX_DIFF_LINES` lines have been emitted.
pub fn line_diff(old: &str, new: &str) -> LineDiff {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let mut lines = Vec::new();
    let (mut oi, mut ni) = (0, 0);

    while (oi < old_lines.len() || ni < new_lines.len()) && lines.len() < MAX_DIFF_LINES {
        match (old_lines.get(oi), new_lines.get(ni)) {
            (None, Some(added)) => {
                lines.push(DiffLine::Added(added.to_string()));
                ni += 1;
            }
            (Some(removed), None) => {
                lines.push(DiffLine::Removed(removed.to_string()));
                oi += 1;
            }
            (Some(o), Some(n)) if o == n => {
                lines.push(DiffLine::Context(o.to_string()));
                oi += 1;
                ni += 1;
            }
            (Some(o), Some(n)) => {
                lines.push(DiffLine::Removed(o.to_string()));
                lines.push(DiffLine::Added(n.to_string()));
                oi += 1;
                ni += 1;
            }
            (None, None) => break,
        }
    }

    LineDiff {
        lines,
        remaining: (old_lines.len() - oi) + (new_lines.len() - ni),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn state(id: &str, hash: &str, order: usize) -> BlockState {
        BlockState {
            id: id.to_string(),
            heading: format!("# {}", id),
            content_hash: hash.to_string(),
            block_type: crate::parser::BlockType::HeadingSection,
            order,
        }
    }

    fn snapshot(blocks: Vec<BlockState>) -> BlockSnapshot {
        BlockSnapshot {
            file_path: "note.md".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            blocks,
            front_matter: None,
        }
    }

    #[test]
    fn test_identical_snapshots_have_no_changes() {
        let s = snapshot(vec![state("b1", "h1", 0), state("b2", "h2", 1)]);
        assert!(compare_blocks(Some(&s), Some(&s)).is_empty());
        assert!(compare_blocks(None, None).is_empty());
    }

    #[test]
    fn test_all_added_and_all_deleted() {
        let s = snapshot(vec![state("b1", "h1", 0), state("b2", "h2", 1)]);

        let added = compare_blocks(None, Some(&s));
        assert_eq!(added.len(), 2);
        assert!(added.iter().all(|c| c.change_type == BlockChangeType::Added));
        assert_eq!(added[0].new_hash.as_deref(), Some("h1"));
        assert_eq!(added[0].old_hash, None);

        let deleted = compare_blocks(Some(&s), None);
        assert_eq!(deleted.len(), 2);
        assert!(deleted.iter().all(|c| c.change_type == BlockChangeType::Deleted));
        assert_eq!(deleted[1].old_hash.as_deref(), Some("h2"));
        assert_eq!(deleted[1].new_hash, None);
    }

    #[test]
    fn test_single_modification() {
        let a = snapshot(vec![state("b1", "h1", 0), state("b2", "h2", 1)]);
        let b = snapshot(vec![state("b1", "h1", 0), state("b2", "h2-new", 1)]);

        let changes = compare_blocks(Some(&a), Some(&b));
        assert_eq!(
            changes,
            vec![BlockChange {
                block_id: "b2".to_string(),
                change_type: BlockChangeType::Modified,
                heading: "# b2".to_string(),
                old_hash: Some("h2".to_string()),
                new_hash: Some("h2-new".to_string()),
            }]
        );
    }

    #[test]
    fn test_renamed_block_is_delete_plus_add() {
        let a = snapshot(vec![state("old-id", "h1", 0)]);
        let b = snapshot(vec![state("new-id", "h1", 0)]);

        let changes = compare_blocks(Some(&a), Some(&b));
        let kinds: Vec<_> = changes.iter().map(|c| c.change_type).collect();
        assert_eq!(kinds, vec![BlockChangeType::Added, BlockChangeType::Deleted]);
    }

    #[test]
    fn test_block_change_json() {
        let change = BlockChange::added(&state("b1", "h1", 0));
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["blockId"], "b1");
        assert_eq!(json["type"], "ADDED");
        assert_eq!(json["newHash"], "h1");
        assert!(json.get("oldHash").is_none());
    }

    #[test]
    fn test_line_diff_context_and_modification() {
        let diff = line_diff("# A\nsame\nold", "# A\nsame\nnew\nextra");
        assert_eq!(
            diff.lines,
            vec![
                DiffLine::Context("# A".to_string()),
                DiffLine::Context("same".to_string()),
                DiffLine::Removed("old".to_string()),
                DiffLine::Added("new".to_string()),
                DiffLine::Added("extra".to_string()),
            ]
        );
        assert_eq!(diff.remaining, 0);
    }

    #[test]
    fn test_line_diff_is_positional() {
        // An inserted line shifts everything after it; no realignment happens.
        let diff = line_diff("a\nb", "x\na\nb");
        assert_eq!(
            diff.lines,
            vec![
                DiffLine::Removed("a".to_string()),
                DiffLine::Added("x".to_string()),
                DiffLine::Removed("b".to_string()),
                DiffLine::Added("a".to_string()),
                DiffLine::Added("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_diff_truncates() {
        let old: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let diff = line_diff(&old, "");
        assert_eq!(diff.lines.len(), MAX_DIFF_LINES);
        assert_eq!(diff.remaining, 15);
        assert!(diff.is_truncated());
    }

    #[test]
    fn test_line_diff_pair_may_exceed_limit_by_one() {
        let old: String = (0..20).map(|i| format!("o{}\n", i)).collect();
        let new: String = (0..20).map(|i| format!("n{}\n", i)).collect();
        let diff = line_diff(&old, &new);
        assert_eq!(diff.lines.len(), 16);
        assert_eq!(diff.remaining, 24);
    }

    #[test]
    fn test_previews() {
        let added = LineDiff::added("a\nb\nc", 2);
        assert_eq!(
            added.lines,
            vec![DiffLine::Added("a".to_string()), DiffLine::Added("b".to_string())]
        );
        assert_eq!(added.remaining, 1);

        let removed = LineDiff::removed("a", 5);
        assert_eq!(removed.lines, vec![DiffLine::Removed("a".to_string())]);
        assert!(!removed.is_truncated());
    }
}
