//! Local/remote coordination
//!
//! Remote wins on load when its copy decrypts; otherwise the local slot is
//! used. Saves always go to the local slot first and are then pushed to the
//! remote when a household, passphrase and configuration are all present.
//! Concurrent writers from different devices resolve last-write-wins.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::crypto::{self, Envelope, Passphrase};
use crate::error::{SyncError, SyncResult};
use crate::models::Ledger;
use crate::remote::RemoteStore;
use crate::storage::LocalStore;

use super::outcome::{LoadOutcome, RemoteStatus, SaveOutcome};

/// Upper bound on a single remote call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Household and passphrase, when both are usable
fn credentials<'a>(
    household_id: Option<&'a str>,
    passphrase: Option<&'a str>,
) -> Option<(&'a str, &'a str)> {
    let household_id = household_id.map(str::trim).filter(|h| !h.is_empty())?;
    let passphrase = passphrase.filter(|p| !p.is_empty())?;
    Some((household_id, passphrase))
}

/// Key derivation is deliberately slow; keep it off the async workers
async fn open_envelope(passphrase: &str, envelope: Envelope) -> SyncResult<Ledger> {
    let passphrase = Passphrase::new(passphrase);
    tokio::task::spawn_blocking(move || -> SyncResult<Ledger> {
        let ledger: Ledger = crypto::decrypt(&passphrase, &envelope)?;
        ledger.check_schema()?;
        Ok(ledger)
    })
    .await
    .map_err(|e| SyncError::Encryption(format!("decryption task failed: {}", e)))?
}

async fn seal_ledger(passphrase: &str, ledger: &Ledger) -> SyncResult<Envelope> {
    let passphrase = Passphrase::new(passphrase);
    let ledger = ledger.clone();
    tokio::task::spawn_blocking(move || crypto::encrypt(&passphrase, &ledger))
        .await
        .map_err(|e| SyncError::Encryption(format!("encryption task failed: {}", e)))?
}

/// Coordinates one local slot and one remote table
pub struct SyncOrchestrator<L, R> {
    local: L,
    remote: R,
    remote_timeout: Duration,
}

impl<L: LocalStore, R: RemoteStore> SyncOrchestrator<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Bound each remote call by `remote_timeout`
    pub fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Whether remote configuration is present
    pub fn cloud_available(&self) -> bool {
        self.remote.is_available()
    }

    /// Load the best available ledger, or `None` if there is none.
    pub async fn load_state(
        &self,
        household_id: Option<&str>,
        passphrase: Option<&str>,
    ) -> Option<Ledger> {
        self.load_state_detailed(household_id, passphrase)
            .await
            .into_ledger()
    }

    /// Load the best available ledger and report why the remote copy was or
    /// wasn't used.
    ///
    /// A remote ledger that decrypts is mirrored into the local slot before
    /// it is returned. Every remote failure falls back to the local slot.
    pub async fn load_state_detailed(
        &self,
        household_id: Option<&str>,
        passphrase: Option<&str>,
    ) -> LoadOutcome {
        let status = match credentials(household_id, passphrase) {
            None => {
                debug!("no household or passphrase, loading local slot");
                RemoteStatus::NotAttempted
            }
            Some(_) if !self.cloud_available() => {
                debug!("cloud sync unavailable, loading local slot");
                RemoteStatus::NotAttempted
            }
            Some((household_id, passphrase)) => {
                match self.pull_remote(household_id, passphrase).await {
                    Ok(ledger) => {
                        self.local.save(&ledger);
                        info!(
                            buckets = ledger.buckets.len(),
                            transactions = ledger.transactions.len(),
                            "loaded ledger from cloud"
                        );
                        return LoadOutcome::Remote(ledger);
                    }
                    Err(status) => status,
                }
            }
        };

        let ledger = self.local.load();
        debug!(found = ledger.is_some(), %status, "using local ledger");
        LoadOutcome::Local {
            ledger,
            remote: status,
        }
    }

    async fn pull_remote(&self, household_id: &str, passphrase: &str) -> Result<Ledger, RemoteStatus> {
        let envelope = match timeout(self.remote_timeout, self.remote.fetch(household_id)).await {
            Err(_) => {
                warn!(timeout = ?self.remote_timeout, "cloud fetch timed out");
                return Err(RemoteStatus::TimedOut);
            }
            Ok(None) => return Err(RemoteStatus::NoRemoteData),
            Ok(Some(envelope)) => envelope,
        };

        open_envelope(passphrase, envelope).await.map_err(|e| {
            let status = RemoteStatus::from_open_error(&e);
            warn!(error = %e, "cloud copy not usable, falling back to local");
            status
        })
    }

    /// Report a cloud copy that an upload would replace without this device
    /// having been able to read it.
    ///
    /// `None` means uploading is safe: credentials or configuration are
    /// missing, there is no row, or the row opens under `passphrase`.
    /// Nothing is mirrored into the local slot.
    pub async fn unreadable_remote(
        &self,
        household_id: Option<&str>,
        passphrase: Option<&str>,
    ) -> Option<RemoteStatus> {
        let (household_id, passphrase) = credentials(household_id, passphrase)?;
        if !self.cloud_available() {
            return None;
        }
        self.pull_remote(household_id, passphrase)
            .await
            .err()
            .filter(RemoteStatus::protects_remote)
    }

    /// Persist locally, then push to the remote when possible.
    ///
    /// The local write always happens first. An `Err` here is always
    /// [`SyncError::RemoteWrite`] and means the local copy is already saved.
    pub async fn save_state(
        &self,
        ledger: &Ledger,
        household_id: Option<&str>,
        passphrase: Option<&str>,
    ) -> SyncResult<SaveOutcome> {
        self.local.save(ledger);

        let Some((household_id, passphrase)) = credentials(household_id, passphrase) else {
            debug!("no household or passphrase, saved locally only");
            return Ok(SaveOutcome::LocalOnly);
        };
        if !self.cloud_available() {
            debug!("cloud sync unavailable, saved locally only");
            return Ok(SaveOutcome::LocalOnly);
        }

        let envelope = seal_ledger(passphrase, ledger)
            .await
            .map_err(|e| SyncError::RemoteWrite(format!("failed to seal ledger: {}", e)))?;

        match timeout(self.remote_timeout, self.remote.upsert(household_id, &envelope)).await {
            Err(_) => {
                warn!(timeout = ?self.remote_timeout, "cloud upsert timed out");
                Err(SyncError::RemoteWrite("upsert timed out".into()))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "cloud upsert failed, local copy kept");
                Err(match e {
                    SyncError::RemoteWrite(_) => e,
                    other => SyncError::RemoteWrite(other.to_string()),
                })
            }
            Ok(Ok(())) => {
                info!("ledger synced to cloud");
                Ok(SaveOutcome::Synced)
            }
        }
    }
}
