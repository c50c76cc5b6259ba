//! CRC32 checksums over stored sessions
//!
//! Every read validates the checksum; a mismatch means the session file
//! cannot be trusted and must not be restored.

use crc32fast::Hasher;

/// Computes a CRC32 (IEEE) checksum over `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}
