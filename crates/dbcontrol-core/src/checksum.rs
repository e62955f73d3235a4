//! Checksum computation for synthesized statements
//!
//! The ledger column holding the fingerprint is 32 hex characters wide, so
//! the digest is MD5.

use md5::{Digest, Md5};

/// Compute the MD5 checksum of a statement as lowercase hex
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
