//! Hashing utilities for content-addressed file names.

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    sha256_bytes(s.as_bytes())
}

/// Hex SHA256 of `s`, truncated to `len` characters.
pub fn content_hash(s: &str, len: usize) -> String {
    let mut hash = sha256_str(s);
    hash.truncate(len);
    hash
}
