//! Content fingerprints for addressing and verifying cached blobs

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash bytes using SHA256, returning the full lowercase hex digest
pub fn digest(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    hex::encode(hasher.finalize())
}

/// Two-character shard directory name for a hex digest
pub fn shard(digest: &str) -> &str {
    &digest[..2]
}

/// Check that a string looks like a digest produced by [`digest`]
pub fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
