//! Passphrase-sealed envelopes (AES-256-GCM)
//!
//! An [`Envelope`] carries one serialized document encrypted under a key
//! derived from the household passphrase. Salt and nonce are generated fresh
//! for every call, so sealing the same document twice never yields the same
//! envelope.
//!
//! Wire form:
//!
//! ```json
//! { "v": 1, "salt": "<base64>", "iv": "<base64>", "cipher": "<base64>" }
//! ```

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{SyncError, SyncResult};

use super::key_derivation::{derive_key, generate_salt, SALT_SIZE};

/// The only envelope version this build reads and writes
pub const ENVELOPE_VERSION: u32 = 1;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Encrypted document with the parameters needed to open it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Format version
    #[serde(rename = "v")]
    pub version: u32,
    /// PBKDF2 salt (base64)
    pub salt: String,
    /// AES-GCM nonce (base64)
    pub iv: String,
    /// Ciphertext with authentication tag (base64)
    #[serde(rename = "cipher")]
    pub ciphertext: String,
}

impl Envelope {
    fn new(salt: &[u8], iv: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            salt: STANDARD.encode(salt),
            iv: STANDARD.encode(iv),
            ciphertext: STANDARD.encode(ciphertext),
        }
    }

    /// Render as the JSON object stored in remote rows
    pub fn to_json(&self) -> SyncResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse the JSON object stored in remote rows
    pub fn from_json(value: serde_json::Value) -> SyncResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Decode a base64 field. Any structural damage is an authentication failure.
fn decode_field(encoded: &str, expected_len: Option<usize>) -> SyncResult<Vec<u8>> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| SyncError::DecryptionFailed)?;
    match expected_len {
        Some(len) if bytes.len() != len => Err(SyncError::DecryptionFailed),
        _ => Ok(bytes),
    }
}

/// Seal raw bytes under a passphrase
pub fn encrypt_bytes(passphrase: &str, plaintext: &[u8]) -> SyncResult<Envelope> {
    let salt = generate_salt();
    let key = derive_key(passphrase, &salt);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SyncError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| SyncError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(Envelope::new(&salt, &nonce_bytes, &ciphertext))
}

/// Open an envelope and return the raw plaintext
pub fn decrypt_bytes(passphrase: &str, envelope: &Envelope) -> SyncResult<Zeroizing<Vec<u8>>> {
    if envelope.version != ENVELOPE_VERSION {
        return Err(SyncError::UnsupportedVersion(envelope.version));
    }

    let salt = decode_field(&envelope.salt, Some(SALT_SIZE))?;
    let nonce_bytes = decode_field(&envelope.iv, Some(NONCE_SIZE))?;
    let ciphertext = decode_field(&envelope.ciphertext, None)?;

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SyncError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| SyncError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}

/// Serialize a document to JSON and seal it
pub fn encrypt<T>(passphrase: &str, document: &T) -> SyncResult<Envelope>
where
    T: Serialize + ?Sized,
{
    let plaintext = Zeroizing::new(
        serde_json::to_vec(document)
            .map_err(|e| SyncError::Encryption(format!("Failed to serialize document: {}", e)))?,
    );
    encrypt_bytes(passphrase, &plaintext)
}

/// Open an envelope and deserialize the document inside
pub fn decrypt<T>(passphrase: &str, envelope: &Envelope) -> SyncResult<T>
where
    T: DeserializeOwned,
{
    let plaintext = decrypt_bytes(passphrase, envelope)?;
    serde_json::from_slice(&plaintext).map_err(|e| SyncError::MalformedPayload(e.to_string()))
}
