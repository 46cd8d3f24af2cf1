//! Transaction model
//!
//! A dated, signed money movement, optionally assigned to a bucket.
//! Transactions are soft-deleted so they can be restored or purged later.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BucketId, TransactionId};
use super::money::Money;
use super::month::MonthKey;

/// A ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Transaction date
    pub date: NaiveDate,

    /// Free-form description (usually the bank's text)
    #[serde(default)]
    pub description: String,

    /// Amount (positive for inflow, negative for outflow)
    pub amount: Money,

    /// Assigned bucket, `None` when unassigned
    #[serde(default)]
    pub bucket_id: Option<BucketId>,

    /// Soft-delete flag
    #[serde(default)]
    pub deleted: bool,

    /// Fields written by other clients, carried through unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Transaction {
    /// Create a new unassigned transaction
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Money) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            description: description.into(),
            amount,
            bucket_id: None,
            deleted: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Builder-style bucket assignment
    pub fn with_bucket(mut self, bucket_id: BucketId) -> Self {
        self.bucket_id = Some(bucket_id);
        self
    }

    /// The budget month this transaction falls in
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    /// Whether this transaction is unassigned
    pub fn is_unassigned(&self) -> bool {
        self.bucket_id.is_none()
    }

    /// Whether this transaction counts toward `bucket_id` in `month`
    pub fn counts_toward(&self, bucket_id: &BucketId, month: MonthKey) -> bool {
        !self.deleted && self.bucket_id.as_ref() == Some(bucket_id) && month.contains(self.date)
    }

    /// Mark as deleted
    pub fn soft_delete(&mut self) {
        self.deleted = true;
    }

    /// Clear the deleted flag
    pub fn restore(&mut self) {
        self.deleted = false;
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}
