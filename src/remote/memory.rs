//! In-memory remote store
//!
//! Stands in for the hosted table in tests and offline runs. Switches let a
//! caller make the backend unconfigured, reject writes, or answer slowly.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::crypto::Envelope;
use crate::error::{SyncError, SyncResult};

use super::{envelope_from_payload, RemoteStore};

/// In-memory household table.
///
/// Clones share the same table, so a test can keep a handle while the
/// orchestrator owns another.
#[derive(Debug, Clone)]
pub struct MemoryRemoteStore {
    inner: Arc<RwLock<MemoryRemoteStoreInner>>,
}

#[derive(Debug)]
struct MemoryRemoteStoreInner {
    /// household_id -> payload column
    rows: HashMap<String, Value>,
    available: bool,
    /// When set, every upsert fails with this message
    reject_writes: Option<String>,
    latency: Option<Duration>,
    upserts: usize,
}

impl Default for MemoryRemoteStoreInner {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            available: true,
            reject_writes: None,
            latency: None,
            upserts: 0,
        }
    }
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryRemoteStoreInner::default())),
        }
    }

    /// A store with no configuration: fetches nothing, refuses writes
    pub fn unconfigured() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    pub fn set_available(&self, available: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.available = available;
        }
    }

    /// Make every subsequent upsert fail (`Some`) or succeed again (`None`)
    pub fn set_reject_writes(&self, reason: Option<&str>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.reject_writes = reason.map(str::to_string);
        }
    }

    /// Delay every call, for exercising timeouts
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.latency = latency;
        }
    }

    /// Store an arbitrary payload for a household
    pub fn insert_raw(&self, household_id: &str, payload: Value) {
        if let Ok(mut inner) = self.inner.write() {
            inner.rows.insert(household_id.to_string(), payload);
        }
    }

    /// The stored payload for a household
    pub fn row(&self, household_id: &str) -> Option<Value> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.rows.get(household_id).cloned())
    }

    /// Number of upserts accepted so far
    pub fn upsert_count(&self) -> usize {
        self.inner.read().map(|inner| inner.upserts).unwrap_or(0)
    }

    fn latency(&self) -> Option<Duration> {
        self.inner.read().ok().and_then(|inner| inner.latency)
    }
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch(&self, household_id: &str) -> Option<Envelope> {
        if let Some(latency) = self.latency() {
            tokio::time::sleep(latency).await;
        }
        if !self.is_available() {
            return None;
        }
        envelope_from_payload(self.row(household_id)?)
    }

    async fn upsert(&self, household_id: &str, envelope: &Envelope) -> SyncResult<()> {
        if let Some(latency) = self.latency() {
            tokio::time::sleep(latency).await;
        }
        let payload = envelope.to_json()?;

        let mut inner = self
            .inner
            .write()
            .map_err(|e| SyncError::RemoteWrite(format!("failed to acquire write lock: {}", e)))?;

        if !inner.available {
            return Err(SyncError::RemoteUnavailable(
                "remote store not configured".into(),
            ));
        }
        if let Some(reason) = &inner.reject_writes {
            return Err(SyncError::RemoteWrite(reason.clone()));
        }

        inner.rows.insert(household_id.to_string(), payload);
        inner.upserts += 1;
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.inner.read().map(|inner| inner.available).unwrap_or(false)
    }
}
