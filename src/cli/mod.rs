//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the sync and service layers.

pub mod envelope;
pub mod ledger;
pub mod passphrase;
pub mod session;

pub use envelope::{handle_open, handle_seal};
pub use ledger::{handle_config, handle_init, handle_month, handle_pull, handle_push};
pub use passphrase::PASSPHRASE_ENV;
pub use session::{Overrides, Session};
