//! Per-request nonce generation for inline scripts and styles.

use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;

/// Generates random nonces from the thread-local CSPRNG.
#[derive(Debug, Clone)]
pub struct NonceGenerator {
    num_bytes: usize,
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self { num_bytes: 16 }
    }
}

impl NonceGenerator {
    pub fn new(num_bytes: usize) -> Self {
        Self { num_bytes }
    }

    /// Generate a fresh base64-encoded nonce.
    pub fn generate(&self) -> String {
        let mut bytes = vec![0u8; self.num_bytes];
        rand::thread_rng().fill_bytes(&mut bytes);
        general_purpose::STANDARD.encode(&bytes)
    }
}
