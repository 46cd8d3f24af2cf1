//! Remote store for household envelopes
//!
//! One row per household identifier, each holding a single sealed
//! [`Envelope`]. Reads are forgiving: anything short of a usable envelope
//! comes back as `None`. Writes are strict: a configured backend that fails
//! or rejects the write surfaces
//! [`SyncError::RemoteWrite`](crate::error::SyncError::RemoteWrite).

pub mod config;
pub mod memory;
pub mod rest;

use async_trait::async_trait;

use crate::crypto::Envelope;
use crate::error::SyncResult;

pub use config::RemoteConfig;
pub use memory::MemoryRemoteStore;
pub use rest::RestRemoteStore;

/// Asynchronous household envelope store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the envelope for a household.
    ///
    /// Returns `None` when the backend is unreachable, unconfigured, has no
    /// row for the household, or the row does not hold an envelope.
    async fn fetch(&self, household_id: &str) -> Option<Envelope>;

    /// Create or replace the household's envelope
    async fn upsert(&self, household_id: &str, envelope: &Envelope) -> SyncResult<()>;

    /// Whether remote configuration is present
    fn is_available(&self) -> bool;
}

/// Interpret a stored payload column as an envelope.
///
/// Rows may hold the envelope as a JSON object or as JSON text.
pub(crate) fn envelope_from_payload(payload: serde_json::Value) -> Option<Envelope> {
    let value = match payload {
        serde_json::Value::String(text) => serde_json::from_str(&text).ok()?,
        other => other,
    };
    Envelope::from_json(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_object_or_text() {
        let object = json!({"v": 1, "salt": "AA==", "iv": "AA==", "cipher": "AA=="});
        assert!(envelope_from_payload(object.clone()).is_some());
        assert!(envelope_from_payload(json!(object.to_string())).is_some());
    }

    #[test]
    fn test_payload_future_version_still_parses() {
        let envelope =
            envelope_from_payload(json!({"v": 2, "salt": "", "iv": "", "cipher": ""})).unwrap();
        assert_eq!(envelope.version, 2);
    }

    #[test]
    fn test_payload_not_an_envelope() {
        assert!(envelope_from_payload(json!({"buckets": []})).is_none());
        assert!(envelope_from_payload(json!(null)).is_none());
        assert!(envelope_from_payload(json!("garbage")).is_none());
    }
}
