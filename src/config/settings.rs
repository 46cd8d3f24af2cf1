//! User settings for budget-sync
//!
//! Persisted as `config.json` in the base directory. Holds the remote store
//! configuration and the default household identifier. The passphrase is
//! never written here.

use serde::{Deserialize, Serialize};

use super::paths::BudgetPaths;
use crate::error::SyncError;
use crate::remote::RemoteConfig;

/// User settings for budget-sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Remote store endpoint and credential
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Default household identifier for cloud sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            remote: RemoteConfig::default(),
            household_id: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &BudgetPaths) -> Result<Self, SyncError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| SyncError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| SyncError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BudgetPaths) -> Result<(), SyncError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SyncError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SyncError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
