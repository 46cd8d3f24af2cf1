//! Standalone envelope commands
//!
//! `seal` encrypts any file into an envelope JSON document and `open`
//! reverses it. Neither touches the ledger or the cloud.

use std::fs;
use std::path::Path;

use crate::crypto::{decrypt_bytes, encrypt_bytes, Envelope};
use crate::error::{SyncError, SyncResult};

use super::passphrase::{read_new_passphrase, read_passphrase};

/// Encrypt `input` into an envelope written to `output`
pub fn handle_seal(input: &Path, output: &Path) -> SyncResult<()> {
    let plaintext = fs::read(input)?;
    let passphrase = read_new_passphrase()?;

    let envelope = encrypt_bytes(&passphrase, &plaintext)?;
    let json = serde_json::to_string_pretty(&envelope)?;
    fs::write(output, json)?;

    println!("Sealed {} into {}", input.display(), output.display());
    Ok(())
}

/// Decrypt the envelope in `input` and write the plaintext to `output`
pub fn handle_open(input: &Path, output: &Path) -> SyncResult<()> {
    let contents = fs::read_to_string(input)?;
    let envelope: Envelope = serde_json::from_str(&contents).map_err(|e| {
        SyncError::Validation(format!("{} is not an envelope: {}", input.display(), e))
    })?;
    let passphrase = read_passphrase("Passphrase: ")?;

    let plaintext = decrypt_bytes(&passphrase, &envelope)?;
    fs::write(output, plaintext.as_slice())?;

    println!("Opened {} into {}", input.display(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_rejects_non_envelope() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("plain.json");
        fs::write(&input, r#"{"hello":"world"}"#).unwrap();

        let err = handle_open(&input, &temp_dir.path().join("out")).unwrap_err();
        assert!(err.is_validation());
    }
}
