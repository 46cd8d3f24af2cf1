//! Storage layer for budget-sync
//!
//! The local half of the store: a single ledger slot with atomic file writes.

pub mod file_io;
pub mod slot;

pub use file_io::{read_optional, write_json_atomic};
pub use slot::{FileSlot, LocalStore, MemorySlot};

use crate::config::paths::BudgetPaths;

/// The file slot at the configured data directory
pub fn default_slot(paths: &BudgetPaths) -> FileSlot {
    FileSlot::new(paths.ledger_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ledger;
    use tempfile::TempDir;

    #[test]
    fn test_default_slot_location() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let slot = default_slot(&paths);

        assert_eq!(slot.path(), &temp_dir.path().join("data").join("ledger.json"));

        slot.save(&Ledger::new());
        assert!(paths.ledger_file().exists());
    }
}
