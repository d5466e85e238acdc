//! Blob Store
//!
//! Content-addressed storage for block contents. Every blob is keyed by the
//! SHA-256 of its uncompressed bytes, written once and never mutated.

pub mod persistence;

use crate::error::StorageError;
use crate::types::ContentHash;
use serde::{Deserialize, Serialize};

/// Objects larger than this many bytes are gzip-compressed at rest
pub const COMPRESSION_THRESHOLD: usize = 100;

/// Storage statistics for an object store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStoreStats {
    /// Number of stored objects
    pub count: usize,
    /// Bytes occupied on disk (after compression)
    pub total_bytes: u64,
}

/// Blob store interface
pub trait BlobStore {
    /// Store `data` and return its hash. Storing existing content is a no-op.
    fn store(&self, data: &[u8]) -> Result<ContentHash, StorageError>;

    /// Fetch the uncompressed bytes for `hash`, or `None` if no object exists.
    fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn exists(&self, hash: &str) -> Result<bool, StorageError>;

    fn list_hashes(&self) -> Result<Vec<ContentHash>, StorageError>;

    fn stats(&self) -> Result<ObjectStoreStats, StorageError>;

    /// Store a text blob
    fn store_text(&self, text: &str) -> Result<ContentHash, StorageError> {
        self.store(text.as_bytes())
    }

    /// Fetch a blob as text; invalid UTF-8 is replaced rather than rejected
    fn get_text(&self, hash: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .get(hash)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

pub use persistence::FsObjectStore;
