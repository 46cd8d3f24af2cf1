//! Local ledger slot
//!
//! One persisted snapshot of the ledger, unencrypted JSON. Local persistence
//! is best-effort: loads that hit a missing, unreadable, corrupt or
//! too-new slot return `None`, and saves to an unavailable medium are logged
//! and dropped. Nothing here returns an error to the caller.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::models::Ledger;

use super::file_io::{read_optional, write_json_atomic};

/// Synchronous best-effort store for the latest ledger snapshot
pub trait LocalStore: Send + Sync {
    /// Read the slot; `None` when empty, unavailable or unusable
    fn load(&self) -> Option<Ledger>;

    /// Replace the slot; a no-op when the medium is unavailable
    fn save(&self, ledger: &Ledger);
}

/// Parse slot contents, treating anything unusable as absent
fn decode_slot(contents: &str, origin: &str) -> Option<Ledger> {
    match Ledger::from_json_str(contents) {
        Ok(ledger) => Some(ledger),
        Err(e) => {
            warn!(slot = origin, error = %e, "ignoring unusable local ledger");
            None
        }
    }
}

/// Slot backed by a single JSON file
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Create a slot at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The slot's file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl LocalStore for FileSlot {
    fn load(&self) -> Option<Ledger> {
        let origin = self.path.display().to_string();
        match read_optional(&self.path) {
            Ok(Some(contents)) => decode_slot(&contents, &origin),
            Ok(None) => {
                debug!(slot = %origin, "local ledger slot is empty");
                None
            }
            Err(e) => {
                warn!(slot = %origin, error = %e, "local ledger slot unavailable");
                None
            }
        }
    }

    fn save(&self, ledger: &Ledger) {
        match write_json_atomic(&self.path, ledger) {
            Ok(()) => debug!(slot = %self.path.display(), "saved local ledger"),
            Err(e) => warn!(slot = %self.path.display(), error = %e, "local save skipped"),
        }
    }
}

/// In-process slot holding the serialized ledger text
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
    unavailable: bool,
}

impl MemorySlot {
    /// An empty, available slot
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot whose medium is unavailable (loads nothing, drops saves)
    pub fn unavailable() -> Self {
        Self {
            contents: Mutex::new(None),
            unavailable: true,
        }
    }

    /// A slot pre-filled with raw text, which need not be valid
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            unavailable: false,
        }
    }

    /// The raw slot text
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl LocalStore for MemorySlot {
    fn load(&self) -> Option<Ledger> {
        if self.unavailable {
            return None;
        }
        let contents = self.contents()?;
        decode_slot(&contents, "memory")
    }

    fn save(&self, ledger: &Ledger) {
        if self.unavailable {
            debug!("memory slot unavailable, local save skipped");
            return;
        }
        let text = match serde_json::to_string(ledger) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "failed to serialize ledger for local slot");
                return;
            }
        };
        match self.contents.lock() {
            Ok(mut slot) => *slot = Some(text),
            Err(_) => warn!("memory slot lock poisoned, local save skipped"),
        }
    }
}
