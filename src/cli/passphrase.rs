//! Passphrase input
//!
//! Taken from `BUDGET_SYNC_PASSPHRASE` when set, otherwise read from the
//! terminal without echo.

use crate::crypto::Passphrase;
use crate::error::{SyncError, SyncResult};

/// Environment variable holding the household passphrase
pub const PASSPHRASE_ENV: &str = "BUDGET_SYNC_PASSPHRASE";

/// Minimum length accepted when choosing a new passphrase
pub const MIN_PASSPHRASE_LEN: usize = 8;

fn from_env() -> Option<Passphrase> {
    std::env::var(PASSPHRASE_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map(Passphrase::from)
}

/// Read the passphrase for an existing envelope or household
pub fn read_passphrase(prompt: &str) -> SyncResult<Passphrase> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }
    prompt_passphrase(prompt)
}

/// Read a passphrase that will seal new data, confirming it when typed
pub fn read_new_passphrase() -> SyncResult<Passphrase> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }

    loop {
        let first = prompt_passphrase("New passphrase: ")?;
        if first.len() < MIN_PASSPHRASE_LEN {
            eprintln!(
                "Passphrase must be at least {} characters. Please try again.",
                MIN_PASSPHRASE_LEN
            );
            continue;
        }

        let second = prompt_passphrase("Confirm passphrase: ")?;
        if first.as_str() != second.as_str() {
            eprintln!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(first);
    }
}

fn prompt_passphrase(prompt: &str) -> SyncResult<Passphrase> {
    rpassword::prompt_password(prompt)
        .map(Passphrase::from)
        .map_err(|e| SyncError::Config(format!("Failed to read passphrase: {}", e)))
}
