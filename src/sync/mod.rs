//! Sync layer: remote-first loads, local-first saves

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::{SyncOrchestrator, DEFAULT_REMOTE_TIMEOUT};
pub use outcome::{LoadOutcome, RemoteStatus, SaveOutcome};
