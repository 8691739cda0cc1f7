//! Content checksums.

use sha2::{Digest, Sha256};

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::BlobHandle;

/// Lowercase hex SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Check that `data` still matches the digest embedded in `handle`.
pub fn verify(handle: &BlobHandle, data: &[u8]) -> AppResult<()> {
    let Some(expected) = handle.checksum() else {
        return Ok(());
    };
    let actual = sha256_hex(data);
    if actual != expected {
        return Err(AppError::storage(format!(
            "Checksum mismatch for blob {handle}: expected {expected}, found {actual}"
        )));
    }
    Ok(())
}
