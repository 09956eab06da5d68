//! # Schema Fingerprints
//!
//! A [`SchemaFingerprint`] is the SHA-256 digest of a model definition
//! text. The model registry keys its compile cache on it, so feeding the
//! same text twice is a lookup rather than a second parse.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a definition text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaFingerprint([u8; 32]);

impl SchemaFingerprint {
    /// Compute the fingerprint of a definition text.
    ///
    /// The text is hashed byte-for-byte; whitespace differences produce
    /// different fingerprints even when the compiled schemas are equal.
    pub fn of(text: &str) -> Self {
        let hash = Sha256::digest(text.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}
