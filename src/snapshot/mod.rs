//! Block Snapshots
//!
//! A snapshot records one file's ordered block list at one point in time. Block
//! contents live in the blob store; the snapshot only carries their hashes.

pub mod diff;
pub mod storage;

use crate::hasher::sha256_hex;
use crate::parser::{Block, BlockType, FrontMatter, ParsedFile};
use crate::types::{BlockID, ContentHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted state of one block inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockState {
    pub id: BlockID,
    pub heading: String,
    pub content_hash: ContentHash,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub order: usize,
}

impl BlockState {
    /// Build the state for a block whose content was stored under `content_hash`
    pub fn from_block(block: &Block, content_hash: ContentHash) -> Self {
        Self {
            id: block.id.clone(),
            heading: block.heading.clone(),
            content_hash,
            block_type: block.block_type,
            order: block.order,
        }
    }

    /// Rebuild the block given its content
    pub fn to_block(&self, content: String) -> Block {
        Block {
            id: self.id.clone(),
            heading: self.heading.clone(),
            content,
            block_type: self.block_type,
            order: self.order,
        }
    }
}

/// One file's block states at one timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot {
    pub file_path: String,
    pub timestamp: DateTime<Utc>,
    pub blocks: Vec<BlockState>,
    #[serde(default)]
    pub front_matter: Option<FrontMatter>,
}

impl BlockSnapshot {
    /// Describe a parsed file without touching the blob store.
    ///
    /// Content hashes are the same ones the blob store would assign, so the
    /// result compares directly against persisted snapshots.
    pub fn from_parsed(parsed: &ParsedFile, timestamp: DateTime<Utc>) -> Self {
        Self {
            file_path: parsed.path.clone(),
            timestamp,
            blocks: parsed
                .blocks
                .iter()
                .map(|block| BlockState::from_block(block, sha256_hex(block.content.as_bytes())))
                .collect(),
            front_matter: parsed.front_matter.clone(),
        }
    }

    pub fn find_block(&self, id_prefix: &str) -> Option<&BlockState> {
        self.blocks.iter().find(|b| b.id.starts_with(id_prefix))
    }
}

pub use diff::{compare_blocks, line_diff, BlockChange, BlockChangeType, DiffLine, LineDiff};
pub use storage::SnapshotStore;
