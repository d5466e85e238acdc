//! Hash computation for blobs, blocks and commits

use crate::types::{BlockID, CommitHash, ContentHash};
use sha2::{Digest, Sha256};

const BLOCK_ID_LEN: usize = 12;
const COMMIT_HASH_LEN: usize = 8;

/// SHA-256 of `data` as lowercase hex
pub fn sha256_hex(data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the BlockID for a block.
///
/// Identity depends on position and heading text only, never on the body, so
/// that edits to a section keep its id.
pub fn compute_block_id(path: &str, cleaned_heading: &str, order: usize) -> BlockID {
    let base = format!("{}:{}:{}", path, cleaned_heading, order);
    let mut id = sha256_hex(base.as_bytes());
    id.truncate(BLOCK_ID_LEN);
    id
}

/// Compute a commit hash from its timestamp, message and (for single-file commits) path
pub fn compute_commit_hash(timestamp: &str, message: &str, path: Option<&str>) -> CommitHash {
    let base = match path {
        Some(path) => format!("{}:{}:{}", timestamp, message, path),
        None => format!("{}:{}", timestamp, message),
    };
    let mut hash = sha256_hex(base.as_bytes());
    hash.truncate(COMMIT_HASH_LEN);
    hash
}

/// Short form of a hash for display and prefix lookups
pub fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(COMMIT_HASH_LEN)]
}

/// Whether `s` is non-empty lowercase/uppercase hex
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_block_id_is_twelve_hex_chars() {
        let id = compute_block_id("note.md", "Intro", 0);
        assert_eq!(id.len(), 12);
        assert!(is_hex(&id));
        assert_eq!(id, sha256_hex(b"note.md:Intro:0")[..12]);
    }

    #[test]
    fn test_block_id_depends_on_position() {
        let a = compute_block_id("note.md", "Intro", 0);
        let b = compute_block_id("note.md", "Intro", 1);
        let c = compute_block_id("other.md", "Intro", 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_commit_hash_includes_path_when_given() {
        let all = compute_commit_hash("2024-01-01T00:00:00Z", "msg", None);
        let single = compute_commit_hash("2024-01-01T00:00:00Z", "msg", Some("a.md"));
        assert_eq!(all.len(), 8);
        assert_ne!(all, single);
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("0123456789abcdef"), "01234567");
        assert_eq!(short_hash("abc"), "abc");
    }
}
