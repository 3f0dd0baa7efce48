use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::shared::constants::REPORT_TOKEN_BYTES;

/// Hashes a plaintext token with the deployment pepper.
///
/// SHA-256 over `token ‖ pepper`, lowercase hex. This is the only form of a
/// token that is ever persisted.
pub fn hash_token(token: &str, pepper: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(pepper.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a new plaintext token: 32 random bytes, hex encoded
pub fn generate_token() -> String {
    let mut bytes = [0u8; REPORT_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Holds the process-wide pepper
#[derive(Clone)]
pub struct TokenHasher {
    pepper: String,
}

impl TokenHasher {
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    pub fn hash(&self, token: &str) -> String {
        hash_token(token, &self.pepper)
    }

    /// Checks `token` against a stored digest without early exit on mismatch
    pub fn matches(&self, token: &str, stored_digest: &str) -> bool {
        constant_time_eq(self.hash(token).as_bytes(), stored_digest.as_bytes())
    }
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
