//! Per-invocation wiring of paths, settings and the sync orchestrator

use url::Url;

use crate::config::{paths::BudgetPaths, settings::Settings};
use crate::crypto::Passphrase;
use crate::error::SyncResult;
use crate::remote::{RemoteConfig, RestRemoteStore};
use crate::storage::{default_slot, FileSlot};
use crate::sync::SyncOrchestrator;

use super::passphrase::read_passphrase;

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub household_id: Option<String>,
    pub endpoint: Option<Url>,
    pub api_key: Option<String>,
}

/// Everything a command needs to load and save the ledger
pub struct Session {
    household_id: Option<String>,
    sync: SyncOrchestrator<FileSlot, RestRemoteStore>,
}

impl Session {
    pub fn open(paths: &BudgetPaths, overrides: Overrides) -> SyncResult<Self> {
        let settings = Settings::load_or_create(paths)?;
        let remote_config = effective_remote(&settings, &overrides);
        let timeout = remote_config.timeout();
        let remote = RestRemoteStore::new(remote_config)?;

        let household_id = overrides
            .household_id
            .or_else(|| settings.household_id.clone())
            .filter(|h| !h.trim().is_empty());

        let sync = SyncOrchestrator::new(default_slot(paths), remote).with_remote_timeout(timeout);

        Ok(Self { household_id, sync })
    }

    pub fn household_id(&self) -> Option<&str> {
        self.household_id.as_deref()
    }

    pub fn sync(&self) -> &SyncOrchestrator<FileSlot, RestRemoteStore> {
        &self.sync
    }

    /// A household is set and the remote is configured
    pub fn wants_cloud(&self) -> bool {
        self.household_id.is_some() && self.sync.cloud_available()
    }

    /// The household passphrase, asked for only when cloud sync will use it
    pub fn passphrase(&self) -> SyncResult<Option<Passphrase>> {
        if !self.wants_cloud() {
            return Ok(None);
        }
        read_passphrase("Household passphrase: ").map(Some)
    }
}

/// Settings with command-line/environment values folded in
pub fn effective_remote(settings: &Settings, overrides: &Overrides) -> RemoteConfig {
    settings
        .remote
        .clone()
        .with_overrides(overrides.endpoint.clone(), overrides.api_key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_household_prefers_override() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut settings = Settings::default();
        settings.household_id = Some("from-settings".into());
        settings.save(&paths).unwrap();

        let session = Session::open(&paths, Overrides::default()).unwrap();
        assert_eq!(session.household_id(), Some("from-settings"));

        let overrides = Overrides {
            household_id: Some("from-flag".into()),
            ..Overrides::default()
        };
        let session = Session::open(&paths, overrides).unwrap();
        assert_eq!(session.household_id(), Some("from-flag"));
    }

    #[test]
    fn test_unconfigured_session_never_asks_for_passphrase() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let overrides = Overrides {
            household_id: Some("home".into()),
            ..Overrides::default()
        };

        let session = Session::open(&paths, overrides).unwrap();
        assert!(!session.wants_cloud());
        assert!(session.passphrase().unwrap().is_none());
    }

    #[test]
    fn test_overrides_fold_into_remote_config() {
        let settings = Settings::default();
        let overrides = Overrides {
            endpoint: Some(Url::parse("https://example.supabase.co").unwrap()),
            api_key: Some("key".into()),
            ..Overrides::default()
        };
        assert!(effective_remote(&settings, &overrides).is_configured());
        assert!(!effective_remote(&settings, &Overrides::default()).is_configured());
    }
}
