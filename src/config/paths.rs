//! Path management for budget-sync
//!
//! ## Path Resolution Order
//!
//! 1. `BUDGET_SYNC_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (`~/.config/budget-sync` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::SyncError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "BUDGET_SYNC_DATA_DIR";

/// File name of the local ledger slot
pub const LEDGER_SLOT_FILE: &str = "ledger.json";

/// Manages all paths used by budget-sync
#[derive(Debug, Clone)]
pub struct BudgetPaths {
    base_dir: PathBuf,
}

impl BudgetPaths {
    /// Resolve paths from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, SyncError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "budget-sync")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    SyncError::Config("Could not determine a configuration directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create BudgetPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the local ledger slot
    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir().join(LEDGER_SLOT_FILE)
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), SyncError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SyncError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| SyncError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if settings have been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
