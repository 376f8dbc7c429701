//! SHA-256 helpers shared by the document hashing and audit code.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of the given bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
