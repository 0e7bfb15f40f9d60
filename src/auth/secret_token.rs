//! One time tokens for email verification and password resets.
//!
//! Only the SHA-256 hash of a token is stored, the raw token is emailed to the user.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A random token and the hash that is stored in the database.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretToken {
    /// The token sent to the user.
    pub raw: String,
    /// The hex encoded SHA-256 hash of `raw`.
    pub hash: String,
}

impl SecretToken {
    /// Generate a new random token.
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        let hash = hash_secret(&raw);

        Self { raw, hash }
    }
}

/// Hash a token sent by a client so it can be looked up in the database.
pub fn hash_secret(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.trim().as_bytes()))
}
