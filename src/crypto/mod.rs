//! Cryptographic functions for budget-sync
//!
//! Provides AES-256-GCM envelopes with PBKDF2-HMAC-SHA256 key derivation
//! for the household ledger stored in the cloud.

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::{
    decrypt, decrypt_bytes, encrypt, encrypt_bytes, Envelope, ENVELOPE_VERSION, NONCE_SIZE,
};
pub use key_derivation::{derive_key, DerivedKey, PBKDF2_ITERATIONS, SALT_SIZE};
pub use secure_memory::Passphrase;
