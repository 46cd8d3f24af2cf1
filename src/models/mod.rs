//! Core data models for budget-sync
//!
//! This module contains the data structures of the ledger document:
//! buckets, transactions, month keys and money amounts.

pub mod bucket;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod month;
pub mod transaction;

pub use bucket::Bucket;
pub use ids::{BucketId, TransactionId};
pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};
pub use money::Money;
pub use month::MonthKey;
pub use transaction::Transaction;
