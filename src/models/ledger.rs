//! Ledger document
//!
//! The ledger is the whole budget: buckets plus transactions. It is the unit
//! that gets persisted locally and sealed into remote envelopes.
//!
//! Compatibility policy: unknown top-level fields are kept in `extra` and
//! written back untouched; a `schemaVersion` newer than
//! [`CURRENT_SCHEMA_VERSION`] is rejected on load.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::bucket::Bucket;
use super::ids::{BucketId, TransactionId};
use super::month::MonthKey;
use super::transaction::Transaction;
use crate::error::{SyncError, SyncResult};

/// Highest ledger schema version this build understands
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// The budget document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// Buckets in display order
    #[serde(default)]
    pub buckets: Vec<Bucket>,

    /// Transactions, newest import first
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    /// Schema version; absent means 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,

    /// Fields written by other clients that this build does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Ledger {
    /// Create an empty ledger stamped with the current schema version
    pub fn new() -> Self {
        Self {
            schema_version: Some(CURRENT_SCHEMA_VERSION),
            ..Self::default()
        }
    }

    /// Effective schema version
    pub fn schema_version(&self) -> u32 {
        self.schema_version.unwrap_or(1)
    }

    /// Reject documents written by a newer schema
    pub fn check_schema(&self) -> SyncResult<()> {
        let version = self.schema_version();
        if version > CURRENT_SCHEMA_VERSION {
            return Err(SyncError::UnsupportedSchema(version));
        }
        Ok(())
    }

    /// Parse a ledger from JSON text and check its schema version
    pub fn from_json_str(json: &str) -> SyncResult<Self> {
        let ledger: Ledger = serde_json::from_str(json)?;
        ledger.check_schema()?;
        Ok(ledger)
    }

    /// Look up a bucket by id
    pub fn bucket(&self, id: &BucketId) -> Option<&Bucket> {
        self.buckets.iter().find(|b| &b.id == id)
    }

    /// Look up a bucket by id for mutation
    pub fn bucket_mut(&mut self, id: &BucketId) -> Option<&mut Bucket> {
        self.buckets.iter_mut().find(|b| &b.id == id)
    }

    /// Find a bucket by name (case-insensitive)
    pub fn bucket_by_name(&self, name: &str) -> Option<&Bucket> {
        self.buckets
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// The income bucket, if the ledger has one
    pub fn income_bucket(&self) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.is_income)
    }

    /// Non-income buckets active in `month`, in display order
    pub fn active_buckets(&self, month: MonthKey) -> impl Iterator<Item = &Bucket> {
        self.buckets
            .iter()
            .filter(move |b| !b.is_income && b.is_active(month))
    }

    /// Look up a transaction by id
    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    /// Look up a transaction by id for mutation
    pub fn transaction_mut(&mut self, id: &TransactionId) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|t| &t.id == id)
    }

    /// Check structural invariants
    ///
    /// A ledger with no buckets is a valid fresh document. Otherwise it must
    /// have exactly one income bucket, unique bucket ids, and every assigned
    /// transaction must reference an existing bucket.
    pub fn validate(&self) -> SyncResult<()> {
        self.check_schema()?;

        let mut seen = HashSet::new();
        for bucket in &self.buckets {
            bucket
                .validate()
                .map_err(|e| SyncError::Validation(format!("{}: {}", bucket.id, e)))?;
            if !seen.insert(&bucket.id) {
                return Err(SyncError::Validation(format!(
                    "Duplicate bucket id: {}",
                    bucket.id
                )));
            }
        }

        if !self.buckets.is_empty() {
            let income_count = self.buckets.iter().filter(|b| b.is_income).count();
            if income_count != 1 {
                return Err(SyncError::Validation(format!(
                    "Ledger must have exactly one income bucket, found {}",
                    income_count
                )));
            }
        }

        for txn in &self.transactions {
            if let Some(bucket_id) = &txn.bucket_id {
                if !seen.contains(bucket_id) {
                    return Err(SyncError::Validation(format!(
                        "Transaction {} references unknown bucket {}",
                        txn.id, bucket_id
                    )));
                }
            }
        }

        Ok(())
    }
}
