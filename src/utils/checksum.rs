//! Content digests in the canonical textual form.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of a byte slice as `sha256:<64 hex chars>`.
///
/// Deterministic and total: any byte slice hashes, including the empty one.
/// The prefix makes the algorithm explicit wherever the token is stored or
/// compared, so a future algorithm change cannot be confused with old data.
///
/// # Examples
///
/// ```
/// use almd::utils::checksum::sha256_hash;
///
/// let token = sha256_hash(b"hello world");
/// assert!(token.starts_with("sha256:"));
/// assert_eq!(token.len(), "sha256:".len() + 64);
/// ```
#[must_use]
pub fn sha256_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
