//! notevc: Block-Level Version Control for Markdown Notes
//!
//! Tracks the history of Markdown notes at the granularity of heading-delimited
//! blocks. Block contents live in a content-addressed blob store, per-file block
//! states are persisted as timestamped snapshots, and commits link snapshots into
//! a parent-ordered timeline.

pub mod config;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod parser;
pub mod repository;
pub mod snapshot;
pub mod store;
pub mod timeline;
pub mod types;
pub mod workspace;

pub use error::{ApiError, StorageError};
pub use repository::Repository;
pub use workspace::Workspace;
