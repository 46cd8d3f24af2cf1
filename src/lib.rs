//! budget-sync - local-first budget ledger with encrypted household sync
//!
//! A household's budget ledger (buckets with monthly allocations, plus
//! transactions) is kept in a local slot and mirrored to a shared cloud row.
//! The cloud only ever sees an AES-256-GCM envelope sealed under a key derived
//! from the household passphrase.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `crypto`: Envelope codec and passphrase handling
//! - `error`: Custom error types
//! - `models`: Ledger data model (buckets, transactions, money, months)
//! - `storage`: Local ledger slot
//! - `remote`: Cloud household table
//! - `sync`: Load/save orchestration across local and remote
//! - `services`: Ledger mutations, carry-forward and month overviews
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use budget_sync::remote::{RemoteConfig, RestRemoteStore};
//! use budget_sync::storage::FileSlot;
//! use budget_sync::sync::SyncOrchestrator;
//!
//! let remote = RestRemoteStore::new(RemoteConfig::default())?;
//! let sync = SyncOrchestrator::new(FileSlot::new("ledger.json".into()), remote);
//! let ledger = sync.load_state(Some("household"), Some("passphrase")).await;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;
pub mod storage;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use models::{Bucket, Ledger, Money, MonthKey, Transaction};
pub use sync::{LoadOutcome, RemoteStatus, SaveOutcome, SyncOrchestrator};
