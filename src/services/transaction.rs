//! Transaction service
//!
//! Import, assignment and the soft-delete lifecycle (delete, restore, purge)
//! on a live ledger.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::models::{BucketId, Ledger, Transaction, TransactionId};

/// Service for transaction changes on a live ledger
pub struct TransactionService<'a> {
    ledger: &'a mut Ledger,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(ledger: &'a mut Ledger) -> Self {
        Self { ledger }
    }

    /// Prepend a batch of imported transactions.
    ///
    /// The batch keeps its own order and lands ahead of everything already in
    /// the ledger. Transactions whose id is already present are skipped.
    /// Returns the number imported.
    pub fn import(&mut self, batch: Vec<Transaction>) -> usize {
        let mut known: HashSet<TransactionId> =
            self.ledger.transactions.iter().map(|t| t.id.clone()).collect();

        let fresh: Vec<Transaction> = batch
            .into_iter()
            .filter(|t| known.insert(t.id.clone()))
            .collect();

        let count = fresh.len();
        self.ledger.transactions.splice(0..0, fresh);
        debug!(count, "imported transactions");
        count
    }

    /// Assign a transaction to a bucket, or unassign it with `None`
    pub fn assign(&mut self, id: &TransactionId, bucket_id: Option<BucketId>) -> SyncResult<()> {
        if let Some(bucket_id) = &bucket_id {
            if self.ledger.bucket(bucket_id).is_none() {
                return Err(SyncError::bucket_not_found(bucket_id.to_string()));
            }
        }
        self.transaction_mut(id)?.bucket_id = bucket_id;
        Ok(())
    }

    /// Soft-delete a transaction
    pub fn soft_delete(&mut self, id: &TransactionId) -> SyncResult<()> {
        self.transaction_mut(id)?.soft_delete();
        Ok(())
    }

    /// Undo a soft delete
    pub fn restore(&mut self, id: &TransactionId) -> SyncResult<()> {
        self.transaction_mut(id)?.restore();
        Ok(())
    }

    /// Permanently drop every soft-deleted transaction. Returns the count removed.
    pub fn purge_deleted(&mut self) -> usize {
        let before = self.ledger.transactions.len();
        self.ledger.transactions.retain(|t| !t.deleted);
        before - self.ledger.transactions.len()
    }

    /// Soft-deleted transactions awaiting restore or purge
    pub fn deleted(&self) -> impl Iterator<Item = &Transaction> {
        self.ledger.transactions.iter().filter(|t| t.deleted)
    }

    fn transaction_mut(&mut self, id: &TransactionId) -> SyncResult<&mut Transaction> {
        self.ledger
            .transaction_mut(id)
            .ok_or_else(|| SyncError::transaction_not_found(id.to_string()))
    }
}
