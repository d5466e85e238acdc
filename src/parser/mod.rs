//! Block Parser
//!
//! Segments a Markdown note into heading-delimited blocks with stable ids, and
//! reconstructs the note text from its blocks.

pub mod front_matter;

use crate::hasher::compute_block_id;
use crate::types::{BlockID, CONTENT_HEADING};
use serde::{Deserialize, Serialize};

pub use front_matter::FrontMatter;

/// Block type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    /// A heading line and the lines following it
    HeadingSection,
    /// Lines before the first heading of a file
    ContentOnly,
}

/// A section of a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockID,
    /// The heading line as written, or `<!-- Content -->`
    pub heading: String,
    /// Full block text including the heading line
    pub content: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub order: usize,
}

impl Block {
    /// Heading text without leading `#` markers
    pub fn clean_heading(&self) -> String {
        clean_heading(&self.heading)
    }
}

/// A note split into blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    pub path: String,
    pub front_matter: Option<FrontMatter>,
    pub blocks: Vec<Block>,
}

impl ParsedFile {
    /// Whether the note participates in commits
    pub fn is_enabled(&self) -> bool {
        self.front_matter
            .as_ref()
            .map(FrontMatter::is_enabled)
            .unwrap_or(true)
    }

    /// Find a block by id prefix
    pub fn find_block(&self, id_prefix: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id.starts_with(id_prefix))
    }

    /// Reassemble the note text
    pub fn reconstruct(&self) -> String {
        reconstruct(self)
    }
}

/// Strip leading `#` markers and surrounding whitespace from a heading line
pub fn clean_heading(heading: &str) -> String {
    heading.trim_start_matches('#').trim().to_string()
}

struct OpenBlock<'a> {
    heading: String,
    block_type: BlockType,
    lines: Vec<&'a str>,
}

fn close_block(path: &str, open: OpenBlock<'_>, order: usize) -> Block {
    Block {
        id: compute_block_id(path, &clean_heading(&open.heading), order),
        heading: open.heading,
        content: open.lines.join("\n"),
        block_type: open.block_type,
        order,
    }
}

/// Parse note text into blocks.
///
/// Lines are split on `\n` only, so a trailing newline stays in the last
/// block's content and reconstruction is byte-exact.
pub fn parse(text: &str, path: &str) -> ParsedFile {
    let lines: Vec<&str> = if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    };

    let (front_matter, body_start) = match front_matter::extract(&lines) {
        Some((fm, next)) => (Some(fm), next),
        None => (None, 0),
    };

    let body = lines.get(body_start..).unwrap_or(&[]);
    let mut blocks = Vec::new();
    if body.is_empty() || (body.len() == 1 && body[0].is_empty()) {
        return ParsedFile {
            path: path.to_string(),
            front_matter,
            blocks,
        };
    }

    let mut current: Option<OpenBlock> = None;
    for line in body {
        if line.starts_with('#') {
            if let Some(open) = current.take() {
                let order = blocks.len();
                blocks.push(close_block(path, open, order));
            }
            current = Some(OpenBlock {
                heading: line.to_string(),
                block_type: BlockType::HeadingSection,
                lines: vec![line],
            });
        } else {
            match current.as_mut() {
                Some(open) => open.lines.push(line),
                None => {
                    current = Some(OpenBlock {
                        heading: CONTENT_HEADING.to_string(),
                        block_type: BlockType::ContentOnly,
                        lines: vec![line],
                    })
                }
            }
        }
    }
    if let Some(open) = current {
        let order = blocks.len();
        blocks.push(close_block(path, open, order));
    }

    ParsedFile {
        path: path.to_string(),
        front_matter,
        blocks,
    }
}

/// Reassemble note text: front matter header, then block contents in `order`
/// joined by single newlines.
pub fn reconstruct(file: &ParsedFile) -> String {
    let mut out = String::new();
    if let Some(fm) = &file.front_matter {
        out.push_str(&fm.to_header());
    }

    let mut blocks: Vec<&Block> = file.blocks.iter().collect();
    blocks.sort_by_key(|b| b.order);
    let body: Vec<&str> = blocks.iter().map(|b| b.content.as_str()).collect();
    out.push_str(&body.join("\n"));
    out
}
