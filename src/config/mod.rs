//! Configuration module for budget-sync
//!
//! This module provides configuration management including:
//! - Path resolution for the settings file and the local ledger slot
//! - User settings persistence (remote store, default household)

pub mod paths;
pub mod settings;

pub use paths::BudgetPaths;
pub use settings::Settings;
