//! Core types for the block-level note versioning system.

/// ContentHash: lowercase hex SHA-256 of a blob's uncompressed bytes
pub type ContentHash = String;

/// BlockID: first 12 hex chars of SHA-256(`path:cleanedHeading:order`)
pub type BlockID = String;

/// CommitHash: first 8 hex chars of SHA-256 over the commit's timestamp and message
pub type CommitHash = String;

/// Heading given to content that precedes the first heading of a file
pub const CONTENT_HEADING: &str = "<!-- Content -->";

/// Snapshots within this many seconds of a commit belong to it
pub const COMMIT_WINDOW_SECS: i64 = 60;
