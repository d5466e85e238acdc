//! Filesystem-backed object store using git-style fan-out:
//! `objects/<first 2 hex>/<remaining hex>`.

use crate::error::StorageError;
use crate::hasher::{is_hex, sha256_hex, short_hash};
use crate::store::{BlobStore, ObjectStoreStats, COMPRESSION_THRESHOLD};
use crate::types::ContentHash;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Object store rooted at a directory
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    compression: bool,
    compression_threshold: usize,
}

impl FsObjectStore {
    /// Create a store with compression enabled at the default threshold
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compression: true,
            compression_threshold: COMPRESSION_THRESHOLD,
        }
    }

    /// Override compression settings for newly written objects.
    ///
    /// Reads always detect gzip by magic bytes, so toggling this never makes
    /// existing objects unreadable.
    pub fn with_compression(mut self, enabled: bool, threshold: usize) -> Self {
        self.compression = enabled;
        self.compression_threshold = threshold;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the object path for a hash
    pub fn object_path(&self, hash: &str) -> Result<PathBuf, StorageError> {
        if hash.len() < 3 {
            return Err(StorageError::InvalidHash(format!("Hash too short: {}", hash)));
        }
        if !is_hex(hash) {
            return Err(StorageError::InvalidHash(format!(
                "Hash is not hexadecimal: {}",
                hash
            )));
        }
        let (dir, file) = hash.split_at(2);
        Ok(self.root.join(dir).join(file))
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        if !self.compression || data.len() <= self.compression_threshold {
            return Ok(data.to_vec());
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }
}

/// Decode stored bytes, decompressing when they carry the gzip magic.
///
/// A blob that looks like gzip but fails to inflate is returned as stored.
fn decode(stored: Vec<u8>) -> Vec<u8> {
    if stored.len() > 2 && stored[..2] == GZIP_MAGIC {
        let mut decoder = GzDecoder::new(stored.as_slice());
        let mut out = Vec::new();
        match decoder.read_to_end(&mut out) {
            Ok(_) => return out,
            Err(e) => {
                tracing::debug!("Gzip decode failed, returning raw object bytes: {}", e);
            }
        }
    }
    stored
}

impl BlobStore for FsObjectStore {
    fn store(&self, data: &[u8]) -> Result<ContentHash, StorageError> {
        let hash = sha256_hex(data);
        let object_path = self.object_path(&hash)?;

        if object_path.exists() {
            tracing::trace!(hash = %short_hash(&hash), "Object already stored");
            return Ok(hash);
        }

        let parent = object_path
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(object_path.display().to_string()))?;
        fs::create_dir_all(parent)?;

        let encoded = self.encode(data)?;
        let temp_path = object_path.with_extension("tmp");
        fs::write(&temp_path, &encoded)?;
        fs::rename(&temp_path, &object_path)?;

        tracing::debug!(
            hash = %short_hash(&hash),
            size = data.len(),
            stored = encoded.len(),
            "Stored object"
        );
        Ok(hash)
    }

    fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let object_path = self.object_path(hash)?;
        if !object_path.exists() {
            return Ok(None);
        }
        let stored = fs::read(&object_path)?;
        Ok(Some(decode(stored)))
    }

    fn exists(&self, hash: &str) -> Result<bool, StorageError> {
        Ok(self.object_path(hash)?.is_file())
    }

    fn list_hashes(&self) -> Result<Vec<ContentHash>, StorageError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut hashes = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|e| StorageError::IoError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if file_name.ends_with(".tmp") {
                continue;
            }
            let dir_name = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            hashes.push(format!("{}{}", dir_name, file_name));
        }
        hashes.sort();
        Ok(hashes)
    }

    fn stats(&self) -> Result<ObjectStoreStats, StorageError> {
        let mut stats = ObjectStoreStats::default();
        for hash in self.list_hashes()? {
            let metadata = fs::metadata(self.object_path(&hash)?)?;
            stats.count += 1;
            stats.total_bytes += metadata.len();
        }
        Ok(stats)
    }
}
