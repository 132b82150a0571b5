//! Random token generation and constant-time comparison.

use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind a CSRF token.
pub const TOKEN_BYTES: usize = 32;

/// `len` bytes straight from the OS generator.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// `TOKEN_BYTES` of OS randomness, hex encoded (64 chars).
pub fn random_token() -> String {
    hex::encode(random_bytes(TOKEN_BYTES))
}

/// Compares every byte regardless of where the first mismatch is.
/// Only the length is allowed to leak.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
