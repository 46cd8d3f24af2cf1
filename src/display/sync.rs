//! Sync result formatting

use crate::models::Ledger;
use crate::sync::{LoadOutcome, RemoteStatus};

/// One-line description of a ledger's contents
pub fn format_ledger_summary(ledger: &Ledger) -> String {
    let deleted = ledger.transactions.iter().filter(|t| t.deleted).count();
    let mut summary = format!(
        "{} bucket(s), {} transaction(s)",
        ledger.buckets.len(),
        ledger.transactions.len()
    );
    if deleted > 0 {
        summary.push_str(&format!(" ({} deleted)", deleted));
    }
    summary
}

/// Where a load came from and what it found
pub fn format_load_outcome(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Remote(ledger) => {
            format!("Loaded from cloud: {}", format_ledger_summary(ledger))
        }
        LoadOutcome::Local { ledger, remote } => {
            let mut output = match ledger {
                Some(ledger) => format!("Loaded from local slot: {}", format_ledger_summary(ledger)),
                None => "No ledger found locally or in the cloud.".to_string(),
            };
            if *remote != RemoteStatus::NotAttempted {
                output.push_str(&format!("\nCloud: {}", remote));
            }
            if outcome.is_decryption_mismatch() {
                output.push_str("\nCheck the household passphrase. Nothing was uploaded over the cloud copy.");
            }
            output
        }
    }
}
