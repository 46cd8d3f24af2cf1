use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the caller's environment and data directory
fn budget_sync(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("budget-sync").unwrap();
    cmd.env("BUDGET_SYNC_DATA_DIR", data_dir)
        .env_remove("BUDGET_SYNC_HOUSEHOLD")
        .env_remove("BUDGET_SYNC_ENDPOINT")
        .env_remove("BUDGET_SYNC_API_KEY")
        .env_remove("BUDGET_SYNC_PASSPHRASE")
        .env_remove("RUST_LOG");
    cmd
}

const LEDGER: &str = r#"{
    "buckets": [
        {"id": "income", "name": "Income", "isIncome": true},
        {"id": "groceries", "name": "Groceries", "allocations": {"2024-03": 400}}
    ],
    "transactions": [
        {"id": "t1", "date": "2024-04-02", "description": "Market", "amount": -55.25, "bucketId": "groceries"}
    ],
    "schemaVersion": 1
}"#;

#[test]
fn test_seal_open_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let plain = temp_dir.path().join("notes.txt");
    let sealed = temp_dir.path().join("notes.envelope.json");
    let opened = temp_dir.path().join("notes.opened.txt");
    fs::write(&plain, "rent is due on the 1st").unwrap();

    budget_sync(temp_dir.path())
        .env("BUDGET_SYNC_PASSPHRASE", "household secret")
        .args(["seal"])
        .arg(&plain)
        .arg(&sealed)
        .assert()
        .success();

    let envelope = fs::read_to_string(&sealed).unwrap();
    assert!(envelope.contains("\"v\": 1"));
    assert!(!envelope.contains("rent"));

    budget_sync(temp_dir.path())
        .env("BUDGET_SYNC_PASSPHRASE", "household secret")
        .args(["open"])
        .arg(&sealed)
        .arg(&opened)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&opened).unwrap(), "rent is due on the 1st");
}

#[test]
fn test_open_with_wrong_passphrase_fails() {
    let temp_dir = TempDir::new().unwrap();
    let plain = temp_dir.path().join("plain.txt");
    let sealed = temp_dir.path().join("sealed.json");
    let opened = temp_dir.path().join("opened.txt");
    fs::write(&plain, "secret").unwrap();

    budget_sync(temp_dir.path())
        .env("BUDGET_SYNC_PASSPHRASE", "right passphrase")
        .arg("seal")
        .arg(&plain)
        .arg(&sealed)
        .assert()
        .success();

    budget_sync(temp_dir.path())
        .env("BUDGET_SYNC_PASSPHRASE", "wrong passphrase")
        .arg("open")
        .arg(&sealed)
        .arg(&opened)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"));

    assert!(!opened.exists());
}

#[test]
fn test_config_without_remote() {
    let temp_dir = TempDir::new().unwrap();

    budget_sync(temp_dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available:      no"))
        .stdout(predicate::str::contains("Household:      (not set)"))
        .stdout(predicate::str::contains("Initialized:      no"));
}

#[test]
fn test_config_env_overrides_hide_key() {
    let temp_dir = TempDir::new().unwrap();

    budget_sync(temp_dir.path())
        .env("BUDGET_SYNC_ENDPOINT", "https://example.supabase.co")
        .env("BUDGET_SYNC_API_KEY", "very-secret-key")
        .env("BUDGET_SYNC_HOUSEHOLD", "smiths")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available:      yes"))
        .stdout(predicate::str::contains("Household:      smiths"))
        .stdout(predicate::str::contains("very-secret-key").not());
}

#[test]
fn test_init_then_pull() {
    let temp_dir = TempDir::new().unwrap();

    budget_sync(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(temp_dir.path().join("config.json").exists());
    assert!(temp_dir.path().join("data").join("ledger.json").exists());

    budget_sync(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Existing settings kept."))
        .stdout(predicate::str::contains("Existing ledger kept."));

    budget_sync(temp_dir.path())
        .arg("pull")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded from local slot: 1 bucket(s)"));
}

#[test]
fn test_push_without_ledger_fails() {
    let temp_dir = TempDir::new().unwrap();

    budget_sync(temp_dir.path())
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No local ledger to push"));
}

#[test]
fn test_push_file_then_month_carries_forward() {
    let temp_dir = TempDir::new().unwrap();
    let ledger_file = temp_dir.path().join("import.json");
    fs::write(&ledger_file, LEDGER).unwrap();

    budget_sync(temp_dir.path())
        .arg("push")
        .arg("--file")
        .arg(&ledger_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("saved locally"));

    budget_sync(temp_dir.path())
        .args(["month", "--from", "2024-03", "--offset", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Month: 2024-04"))
        .stdout(predicate::str::contains("Groceries"))
        .stdout(predicate::str::contains("344.75"))
        .stdout(predicate::str::contains("Carried forward 1 allocation(s) into 2024-04"));

    // Carry-forward already happened; a second visit creates nothing
    budget_sync(temp_dir.path())
        .args(["month", "--from", "2024-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Carried forward").not());
}

#[test]
fn test_month_on_empty_data_dir() {
    let temp_dir = TempDir::new().unwrap();

    budget_sync(temp_dir.path())
        .args(["month", "--from", "2024-01", "--offset=-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Month: 2023-11"))
        .stdout(predicate::str::contains("No active buckets this month."));
}

#[test]
fn test_push_rejects_invalid_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let ledger_file = temp_dir.path().join("two-incomes.json");
    fs::write(
        &ledger_file,
        r#"{"buckets": [
            {"id": "a", "name": "Pay", "isIncome": true},
            {"id": "b", "name": "Bonus", "isIncome": true}
        ], "transactions": []}"#,
    )
    .unwrap();

    budget_sync(temp_dir.path())
        .arg("push")
        .arg("--file")
        .arg(&ledger_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_month_offset_out_of_range_fails() {
    let temp_dir = TempDir::new().unwrap();

    budget_sync(temp_dir.path())
        .args(["month", "--from", "2024-01", "--offset", "2147483647"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    assert!(!temp_dir.path().join("data").join("ledger.json").exists());
}

#[test]
fn test_month_rejects_five_digit_year() {
    let temp_dir = TempDir::new().unwrap();

    budget_sync(temp_dir.path())
        .args(["month", "--from", "9999-12", "--offset", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_push_preserves_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let ledger_file = temp_dir.path().join("annotated.json");
    fs::write(
        &ledger_file,
        r##"{
            "buckets": [
                {"id": "income", "name": "Income", "isIncome": true},
                {"id": "fun", "name": "Fun", "color": "#ff8800"}
            ],
            "transactions": [
                {"id": "t1", "date": "2024-04-02", "amount": -12.5, "bucketId": "fun", "note": "cinema"}
            ]
        }"##,
    )
    .unwrap();

    budget_sync(temp_dir.path())
        .arg("push")
        .arg("--file")
        .arg(&ledger_file)
        .assert()
        .success();

    let stored = fs::read_to_string(temp_dir.path().join("data").join("ledger.json")).unwrap();
    assert!(stored.contains("#ff8800"));
    assert!(stored.contains("cinema"));
}
