//! Ledger commands: init, config, pull, push, month
//!
//! Each command loads through the sync orchestrator (cloud first when a
//! household is configured) and saves back through it (local first).

use std::path::Path;

use tracing::{info, warn};

use crate::config::{paths::BudgetPaths, settings::Settings};
use crate::display::{format_ledger_summary, format_load_outcome, format_month_overview};
use crate::error::{SyncError, SyncResult};
use crate::models::{Ledger, MonthKey};
use crate::remote::{RemoteConfig, RemoteStore};
use crate::services::{month_overview, BudgetService, MonthCursor};
use crate::storage::{default_slot, LocalStore};
use crate::sync::{RemoteStatus, SaveOutcome, SyncOrchestrator};

use super::session::{effective_remote, Overrides, Session};

/// Name of the income bucket created by `init`
pub const DEFAULT_INCOME_BUCKET: &str = "Income";

/// Write default settings and an empty ledger if none exists yet
pub fn handle_init(paths: &BudgetPaths) -> SyncResult<()> {
    println!("Initializing budget-sync at: {}", paths.base_dir().display());
    let already_initialized = paths.is_initialized();
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    settings.save(paths)?;
    if already_initialized {
        println!("Existing settings kept.");
    }

    let slot = default_slot(paths);
    if slot.load().is_none() {
        let mut ledger = Ledger::new();
        BudgetService::new(&mut ledger).add_income_bucket(DEFAULT_INCOME_BUCKET)?;
        slot.save(&ledger);
        println!("Created an empty ledger with an '{}' bucket.", DEFAULT_INCOME_BUCKET);
    } else {
        println!("Existing ledger kept.");
    }

    println!("Initialization complete!");
    Ok(())
}

/// Show paths and remote configuration
pub fn handle_config(paths: &BudgetPaths, overrides: &Overrides) -> SyncResult<()> {
    let settings = Settings::load_or_create(paths)?;
    let remote = effective_remote(&settings, overrides);
    let household = overrides
        .household_id
        .as_deref()
        .or(settings.household_id.as_deref());

    println!("budget-sync Configuration");
    println!("=========================");
    println!("Config directory: {}", paths.base_dir().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!("Ledger slot:      {}", paths.ledger_file().display());
    println!(
        "Initialized:      {}",
        if paths.is_initialized() { "yes" } else { "no (run 'budget-sync init')" }
    );
    println!();
    print_remote(&remote);
    println!("  Household:      {}", household.unwrap_or("(not set)"));
    Ok(())
}

fn print_remote(remote: &RemoteConfig) {
    println!("Cloud sync:");
    println!(
        "  Endpoint:       {}",
        remote
            .endpoint
            .as_ref()
            .map(|u| u.as_str())
            .unwrap_or("(not set)")
    );
    println!(
        "  API key:        {}",
        if remote.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
            "set"
        } else {
            "(not set)"
        }
    );
    println!("  Table:          {}", remote.table);
    println!("  Timeout:        {}s", remote.timeout().as_secs());
    println!(
        "  Available:      {}",
        if remote.is_configured() { "yes" } else { "no" }
    );
}

/// Load the ledger and report where it came from
pub async fn handle_pull(session: &Session) -> SyncResult<()> {
    let passphrase = session.passphrase()?;
    let outcome = session
        .sync()
        .load_state_detailed(session.household_id(), passphrase.as_deref())
        .await;
    println!("{}", format_load_outcome(&outcome));
    Ok(())
}

/// Save the local ledger (or a ledger file) locally and to the cloud.
///
/// Unless `force` is set, a cloud copy this device cannot open is never
/// replaced: the ledger is saved locally and the push fails.
pub async fn handle_push(session: &Session, file: Option<&Path>, force: bool) -> SyncResult<()> {
    let ledger = match file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ledger::from_json_str(&contents)?
        }
        None => session.sync().local().load().ok_or_else(|| {
            SyncError::Validation(
                "No local ledger to push. Run 'budget-sync init' or 'budget-sync pull' first."
                    .into(),
            )
        })?,
    };
    ledger.validate()?;

    let passphrase = session.passphrase()?;
    let outcome = report_save(
        push_ledger(
            session.sync(),
            &ledger,
            session.household_id(),
            passphrase.as_deref(),
            force,
        )
        .await,
    )?;
    println!("Pushed {}: {}.", format_ledger_summary(&ledger), outcome);
    Ok(())
}

async fn push_ledger<L: LocalStore, R: RemoteStore>(
    sync: &SyncOrchestrator<L, R>,
    ledger: &Ledger,
    household_id: Option<&str>,
    passphrase: Option<&str>,
    force: bool,
) -> SyncResult<SaveOutcome> {
    if !force {
        if let Some(status) = sync.unreadable_remote(household_id, passphrase).await {
            warn!(%status, "not replacing a cloud copy this device cannot read");
            sync.save_state(ledger, household_id, None).await?;
            return Err(SyncError::RemoteWrite(format!(
                "refusing to overwrite the cloud copy ({}); use --force to replace it",
                status
            )));
        }
    }
    sync.save_state(ledger, household_id, passphrase).await
}

/// Move to a month relative to `anchor`, carry allocations forward, show the
/// overview and save the result
pub async fn handle_month(
    session: &Session,
    offset: i32,
    anchor: Option<MonthKey>,
) -> SyncResult<()> {
    let passphrase = session.passphrase()?;
    let step = advance_month(
        session.sync(),
        session.household_id(),
        passphrase.as_deref(),
        anchor.unwrap_or_else(MonthKey::current),
        offset,
    )
    .await?;

    print!("{}", format_month_overview(&month_overview(&step.ledger, step.month)));
    if step.created > 0 {
        println!();
        println!("Carried forward {} allocation(s) into {}.", step.created, step.month);
    }
    if let Some(status) = &step.cloud_kept {
        println!();
        println!("Cloud: {}. Saved on this device only; the cloud copy was left untouched.", status);
    }

    let outcome = report_save(step.saved)?;
    info!(month = %step.month, %outcome, "month saved");
    Ok(())
}

/// Result of one `month` invocation
struct MonthStep {
    ledger: Ledger,
    month: MonthKey,
    created: usize,
    /// Set when the cloud copy could not be read and was not uploaded over
    cloud_kept: Option<RemoteStatus>,
    saved: SyncResult<SaveOutcome>,
}

async fn advance_month<L: LocalStore, R: RemoteStore>(
    sync: &SyncOrchestrator<L, R>,
    household_id: Option<&str>,
    passphrase: Option<&str>,
    anchor: MonthKey,
    offset: i32,
) -> SyncResult<MonthStep> {
    let loaded = sync.load_state_detailed(household_id, passphrase).await;
    let cloud_kept = if loaded.may_upload() {
        None
    } else {
        loaded.remote_status().cloned()
    };
    let from_cloud = loaded.is_remote();
    let mut ledger = loaded.into_ledger().unwrap_or_else(Ledger::new);

    let mut cursor = MonthCursor::new(anchor);
    let created = if offset == 0 {
        cursor.refresh(&mut ledger)
    } else {
        cursor.set_offset(&mut ledger, offset)?
    };
    let month = cursor.active_month();
    info!(%month, created, from_cloud, "month prepared");

    let upload_passphrase = match &cloud_kept {
        Some(status) => {
            warn!(%status, "saving month locally only");
            None
        }
        None => passphrase,
    };
    let saved = sync.save_state(&ledger, household_id, upload_passphrase).await;

    Ok(MonthStep {
        ledger,
        month,
        created,
        cloud_kept,
        saved,
    })
}

fn report_save(result: SyncResult<SaveOutcome>) -> SyncResult<SaveOutcome> {
    if let Err(e) = &result {
        if e.is_local_committed() {
            eprintln!("Saved locally, but the cloud copy was not updated.");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;
    use crate::models::{Bucket, Money};
    use crate::remote::MemoryRemoteStore;
    use crate::storage::MemorySlot;
    use crate::sync::LoadOutcome;

    const HOUSEHOLD: &str = "smiths";

    fn month(s: &str) -> MonthKey {
        MonthKey::parse(s).unwrap()
    }

    fn household_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.buckets.push(Bucket::income("Income"));
        ledger
            .buckets
            .push(Bucket::new("Groceries").with_allocation(month("2024-03"), Money::from_units(400)));
        ledger
    }

    fn device(remote: &MemoryRemoteStore) -> SyncOrchestrator<MemorySlot, MemoryRemoteStore> {
        SyncOrchestrator::new(MemorySlot::new(), remote.clone())
    }

    #[tokio::test]
    async fn test_month_with_mistyped_passphrase_keeps_cloud_copy() {
        let remote = MemoryRemoteStore::new();
        let ledger = household_ledger();
        device(&remote)
            .save_state(&ledger, Some(HOUSEHOLD), Some("correct"))
            .await
            .unwrap();

        let laptop = device(&remote);
        let step = advance_month(&laptop, Some(HOUSEHOLD), Some("typo"), month("2024-03"), 1)
            .await
            .unwrap();
        assert_eq!(step.saved.unwrap(), SaveOutcome::LocalOnly);
        assert_eq!(step.cloud_kept, Some(RemoteStatus::DecryptionMismatch));
        assert_eq!(step.month, month("2024-04"));
        assert_eq!(remote.upsert_count(), 1);

        let phone = device(&remote);
        let reloaded = phone
            .load_state_detailed(Some(HOUSEHOLD), Some("correct"))
            .await;
        assert_eq!(reloaded, LoadOutcome::Remote(ledger));
    }

    #[tokio::test]
    async fn test_month_with_right_passphrase_syncs_carry_forward() {
        let remote = MemoryRemoteStore::new();
        device(&remote)
            .save_state(&household_ledger(), Some(HOUSEHOLD), Some("correct"))
            .await
            .unwrap();

        let laptop = device(&remote);
        let step = advance_month(&laptop, Some(HOUSEHOLD), Some("correct"), month("2024-03"), 1)
            .await
            .unwrap();
        assert_eq!(step.saved.unwrap(), SaveOutcome::Synced);
        assert_eq!(step.created, 1);
        assert!(step.cloud_kept.is_none());

        let synced = device(&remote)
            .load_state(Some(HOUSEHOLD), Some("correct"))
            .await
            .unwrap();
        assert_eq!(
            synced.buckets[1].allocation(month("2024-04")),
            Some(Money::from_units(400))
        );
    }

    #[tokio::test]
    async fn test_month_out_of_range_offset_saves_nothing() {
        let remote = MemoryRemoteStore::new();
        let laptop = device(&remote);

        let err = advance_month(&laptop, Some(HOUSEHOLD), Some("correct"), month("2024-03"), i32::MAX)
            .await
            .err()
            .unwrap();
        assert!(err.is_validation());
        assert_eq!(remote.upsert_count(), 0);
        assert!(laptop.local().load().is_none());
    }

    #[tokio::test]
    async fn test_push_refuses_to_replace_unreadable_cloud_copy() {
        let remote = MemoryRemoteStore::new();
        let original = household_ledger();
        let envelope = crypto::encrypt("correct", &original).unwrap();
        remote.upsert(HOUSEHOLD, &envelope).await.unwrap();

        let laptop = device(&remote);
        let mine = Ledger::new();
        let err = push_ledger(&laptop, &mine, Some(HOUSEHOLD), Some("typo"), false)
            .await
            .unwrap_err();
        assert!(err.is_local_committed());
        assert!(err.to_string().contains("--force"));
        assert_eq!(laptop.local().load(), Some(mine.clone()));
        assert_eq!(
            device(&remote).load_state(Some(HOUSEHOLD), Some("correct")).await,
            Some(original)
        );

        let outcome = push_ledger(&laptop, &mine, Some(HOUSEHOLD), Some("typo"), true)
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Synced);
        assert_eq!(
            device(&remote).load_state(Some(HOUSEHOLD), Some("typo")).await,
            Some(mine)
        );
    }
}
