//! Results of load and save passes

use std::fmt;

use crate::error::SyncError;
use crate::models::Ledger;

/// Why a load did not use the remote copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// No household, no passphrase, or no remote configuration
    NotAttempted,
    /// Backend unreachable or holds no row for the household
    NoRemoteData,
    /// The remote envelope did not authenticate under the passphrase
    DecryptionMismatch,
    /// The remote envelope uses a version this build cannot open
    UnsupportedVersion(u32),
    /// Decrypted, but not a ledger this build can use
    Unreadable(String),
    /// The fetch did not finish in time
    TimedOut,
}

impl RemoteStatus {
    /// Classify a failure to open the remote copy
    pub fn from_open_error(error: &SyncError) -> Self {
        match error {
            SyncError::DecryptionFailed => Self::DecryptionMismatch,
            SyncError::UnsupportedVersion(v) => Self::UnsupportedVersion(*v),
            other => Self::Unreadable(other.to_string()),
        }
    }

    /// A cloud copy may exist that this device could not read.
    ///
    /// Uploading in this state would replace data nobody here has seen.
    pub fn protects_remote(&self) -> bool {
        matches!(
            self,
            Self::DecryptionMismatch
                | Self::UnsupportedVersion(_)
                | Self::Unreadable(_)
                | Self::TimedOut
        )
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "cloud sync not attempted"),
            Self::NoRemoteData => write!(f, "no cloud copy found"),
            Self::DecryptionMismatch => {
                write!(f, "cloud copy could not be decrypted with this passphrase")
            }
            Self::UnsupportedVersion(v) => write!(f, "cloud copy uses unsupported version {}", v),
            Self::Unreadable(reason) => write!(f, "cloud copy unreadable: {}", reason),
            Self::TimedOut => write!(f, "cloud fetch timed out"),
        }
    }
}

/// Where a loaded ledger came from
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Decrypted from the remote store; already mirrored into the local slot
    Remote(Ledger),
    /// Fell back to the local slot, which may be empty
    Local {
        ledger: Option<Ledger>,
        remote: RemoteStatus,
    },
}

impl LoadOutcome {
    pub fn into_ledger(self) -> Option<Ledger> {
        match self {
            Self::Remote(ledger) => Some(ledger),
            Self::Local { ledger, .. } => ledger,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Why the remote copy was not used, if it wasn't
    pub fn remote_status(&self) -> Option<&RemoteStatus> {
        match self {
            Self::Remote(_) => None,
            Self::Local { remote, .. } => Some(remote),
        }
    }

    /// Saving the loaded ledger back may also replace the cloud copy
    pub fn may_upload(&self) -> bool {
        !self.remote_status().is_some_and(RemoteStatus::protects_remote)
    }

    /// The remote copy exists but the passphrase does not open it
    pub fn is_decryption_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Local {
                remote: RemoteStatus::DecryptionMismatch,
                ..
            }
        )
    }
}

/// How far a save got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the local slot; cloud sync skipped
    LocalOnly,
    /// Written locally and upserted remotely
    Synced,
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalOnly => write!(f, "saved locally"),
            Self::Synced => write!(f, "saved locally and synced"),
        }
    }
}
