//! Digest and token helpers.
//!
//! Passwords are stored as unsalted SHA-256 hex digests. That is weak on purpose;
//! the same digest function backs flag verification.

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::constants::SESSION_TOKEN_BYTES;

/// Hex encoded SHA-256 digest of `input`.
pub fn sha256_hex(input: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(input.as_ref()))
}

/// Digest a password for storage or comparison.
pub fn hash_password(password: &str) -> String {
    sha256_hex(password)
}

/// Generate a fresh random session token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
