//! Custom error types for budget-sync
//!
//! This module defines the error hierarchy for the store using thiserror.
//! Most of these are absorbed by the sync layer; only a failed remote write
//! reaches the caller of `save_state`.

use thiserror::Error;

/// The main error type for budget-sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Ledger invariant violations
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Envelope version this build does not implement
    #[error("Unsupported envelope version: {0}")]
    UnsupportedVersion(u32),

    /// Ledger schema version newer than this build understands
    #[error("Unsupported ledger schema version: {0}")]
    UnsupportedSchema(u32),

    /// Authentication failure: wrong passphrase, corruption or tampering
    #[error("Decryption failed: invalid passphrase or corrupted data")]
    DecryptionFailed,

    /// Decrypted bytes are not a valid document
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Encryption setup errors (cipher construction, serialization)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Backend unreachable or not configured
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// Configured backend rejected or failed a write
    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SyncError {
    /// Create a "not found" error for buckets
    pub fn bucket_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bucket",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True when the failure happened after the local slot was written.
    ///
    /// `save_state` only returns `RemoteWrite` once local persistence has
    /// already succeeded, so callers can report "saved locally, cloud sync
    /// failed" rather than a lost save.
    pub fn is_local_committed(&self) -> bool {
        matches!(self, Self::RemoteWrite(_))
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for budget-sync operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = SyncError::bucket_not_found("Groceries");
        assert_eq!(err.to_string(), "Bucket not found: Groceries");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decryption_failed_does_not_leak_cause() {
        let err = SyncError::DecryptionFailed;
        assert_eq!(
            err.to_string(),
            "Decryption failed: invalid passphrase or corrupted data"
        );
    }

    #[test]
    fn test_only_remote_write_is_local_committed() {
        assert!(SyncError::RemoteWrite("403".into()).is_local_committed());
        assert!(!SyncError::RemoteUnavailable("no endpoint".into()).is_local_committed());
        assert!(!SyncError::DecryptionFailed.is_local_committed());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
    }
}
