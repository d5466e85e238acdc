//! Error types
//!
//! `StorageError` covers the on-disk stores (objects, snapshots, timeline).
//! `ApiError` is what repository and history operations return.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Missing blob {hash} referenced by block {block_id}")]
    MissingBlob { hash: String, block_id: String },

    #[error("Corrupt snapshot {path}: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },

    #[error("Corrupt timeline: {0}")]
    CorruptTimeline(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors returned by repository and history operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not in a notevc repository: {0}")]
    NotARepository(PathBuf),

    #[error("Repository already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Only markdown files (.md) are supported: {0}")]
    UnsupportedFileType(String),

    #[error("File {0} is disabled (enabled: false in front matter)")]
    FileDisabled(String),

    #[error("No markdown files found to commit")]
    NoMarkdownFiles,

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Block {block} not found in {file}")]
    BlockNotFound { block: String, file: String },

    #[error("No snapshot found for {file} at commit {commit}")]
    SnapshotNotFound { file: String, commit: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::StorageError(StorageError::IoError(err))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
