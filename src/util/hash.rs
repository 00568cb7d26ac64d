//! Hashing utilities for content fingerprints.

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a revisioned filename.
pub const REV_HASH_LEN: usize = 10;

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

/// Short content hash used in fingerprinted filenames.
pub fn content_hash(data: &[u8]) -> String {
    sha256_bytes(data)[..REV_HASH_LEN].to_string()
}
