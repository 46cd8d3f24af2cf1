//! Key derivation using PBKDF2-HMAC-SHA256
//!
//! Derives the envelope key from a household passphrase and a per-envelope
//! salt. The iteration count is a public, fixed parameter: every client that
//! reads or writes envelopes must use the same value to interoperate.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2 iteration count for envelope version 1
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_SIZE: usize = 16;

/// Derived key length in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// A derived encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

/// Generate a fresh random salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive an encryption key from a passphrase and salt
pub fn derive_key(passphrase: &str, salt: &[u8]) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    DerivedKey { key }
}
