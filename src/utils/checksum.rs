//! Digest helpers for sequence-file checksums.
//!
//! Registration records a SHA-256 digest, but a later submission is accepted
//! when either its MD5 or its SHA-256 digest matches the recorded value.

use sha2::{Digest, Sha256};

/// Lowercase hex MD5 digest of `content`.
///
/// # Examples
///
/// ```
/// use genoscreen::utils::checksum::md5_hex;
///
/// assert_eq!(md5_hex(b"ACGT"), "f1f8f4bf413b16ad135722aa4591043e");
/// ```
#[must_use]
pub fn md5_hex(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}

/// Lowercase hex SHA-256 digest of `content`.
#[must_use]
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// True if `expected` equals the MD5 or the SHA-256 hex digest of `content`.
#[must_use]
pub fn verify_checksum(content: &str, expected: &str) -> bool {
    let bytes = content.as_bytes();
    md5_hex(bytes) == expected || sha256_hex(bytes) == expected
}
