//! Budget service
//!
//! Bucket management, allocation carry-forward, and the derived per-month
//! figures (remaining, overview). Derived figures are pure functions of the
//! ledger and a month; nothing here is persisted on its own.

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::models::{Bucket, BucketId, Ledger, Money, MonthKey};

/// Carry the last known allocation of every spending bucket into `month`.
///
/// A bucket that already has an entry for `month` is left alone. A bucket
/// with no allocation strictly before `month` gets no entry, so buckets never
/// appear in months before their first budget. Only strictly earlier entries
/// are read, which makes the transition idempotent and independent of the
/// order in which months are visited.
///
/// Returns the number of entries created.
pub fn carry_forward(ledger: &mut Ledger, month: MonthKey) -> usize {
    let mut created = 0;

    for bucket in ledger.buckets.iter_mut().filter(|b| !b.is_income) {
        if bucket.allocations.contains_key(&month) {
            continue;
        }
        if let Some((from, amount)) = bucket.latest_allocation_before(month) {
            debug!(bucket = %bucket.id, %from, to = %month, %amount, "carrying allocation forward");
            bucket.allocations.insert(month, amount);
            created += 1;
        }
    }

    created
}

/// Allocation for `month` plus the month's non-deleted activity in the bucket
pub fn remaining(ledger: &Ledger, bucket_id: &BucketId, month: MonthKey) -> Money {
    let allocated = ledger
        .bucket(bucket_id)
        .and_then(|b| b.allocation(month))
        .unwrap_or_default();

    allocated + activity(ledger, bucket_id, month)
}

/// Sum of non-deleted transactions assigned to the bucket in `month`
pub fn activity(ledger: &Ledger, bucket_id: &BucketId, month: MonthKey) -> Money {
    ledger
        .transactions
        .iter()
        .filter(|t| t.counts_toward(bucket_id, month))
        .map(|t| t.amount)
        .sum()
}

/// One bucket's line in a month overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub bucket_id: BucketId,
    pub name: String,
    pub allocated: Money,
    pub activity: Money,
    pub remaining: Money,
}

impl BucketSummary {
    /// Spent more than allocated
    pub fn is_overspent(&self) -> bool {
        self.remaining.is_negative()
    }
}

/// Budget overview for a month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthOverview {
    pub month: MonthKey,
    pub income: Money,
    pub total_allocated: Money,
    pub unassigned: Money,
    pub left_to_budget: Money,
    pub buckets: Vec<BucketSummary>,
}

/// Compute the overview of `month` for every active spending bucket
pub fn month_overview(ledger: &Ledger, month: MonthKey) -> MonthOverview {
    let buckets: Vec<BucketSummary> = ledger
        .active_buckets(month)
        .map(|bucket| {
            let allocated = bucket.allocation(month).unwrap_or_default();
            let activity = activity(ledger, &bucket.id, month);
            BucketSummary {
                bucket_id: bucket.id.clone(),
                name: bucket.name.clone(),
                allocated,
                activity,
                remaining: allocated + activity,
            }
        })
        .collect();

    let income = ledger
        .income_bucket()
        .map(|b| activity(ledger, &b.id, month))
        .unwrap_or_default();

    let unassigned: Money = ledger
        .transactions
        .iter()
        .filter(|t| !t.deleted && t.is_unassigned() && month.contains(t.date))
        .map(|t| t.amount)
        .sum();

    let total_allocated: Money = buckets.iter().map(|b| b.allocated).sum();

    MonthOverview {
        month,
        income,
        total_allocated,
        unassigned,
        left_to_budget: income - total_allocated,
        buckets,
    }
}

/// Service for bucket and allocation changes on a live ledger
pub struct BudgetService<'a> {
    ledger: &'a mut Ledger,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(ledger: &'a mut Ledger) -> Self {
        Self { ledger }
    }

    /// Add a spending bucket with an initial allocation in `month`
    pub fn add_bucket(
        &mut self,
        name: &str,
        month: MonthKey,
        amount: Money,
    ) -> SyncResult<BucketId> {
        let bucket = Bucket::new(name.trim()).with_allocation(month, amount);
        bucket
            .validate()
            .map_err(|e| SyncError::Validation(e.to_string()))?;

        if self.ledger.bucket_by_name(&bucket.name).is_some() {
            return Err(SyncError::Validation(format!(
                "Bucket already exists: {}",
                bucket.name
            )));
        }

        let id = bucket.id.clone();
        self.ledger.buckets.push(bucket);
        Ok(id)
    }

    /// Add the income bucket; a ledger holds exactly one
    pub fn add_income_bucket(&mut self, name: &str) -> SyncResult<BucketId> {
        if self.ledger.income_bucket().is_some() {
            return Err(SyncError::Validation(
                "Ledger already has an income bucket".into(),
            ));
        }

        let bucket = Bucket::income(name.trim());
        bucket
            .validate()
            .map_err(|e| SyncError::Validation(e.to_string()))?;

        let id = bucket.id.clone();
        self.ledger.buckets.insert(0, bucket);
        Ok(id)
    }

    /// Rename a bucket
    pub fn rename_bucket(&mut self, id: &BucketId, name: &str) -> SyncResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::Validation("Bucket name cannot be empty".into()));
        }
        let bucket = self.bucket_mut(id)?;
        bucket.name = name.to_string();
        Ok(())
    }

    /// Set the explicit allocation for a bucket in a month
    pub fn set_allocation(&mut self, id: &BucketId, month: MonthKey, amount: Money) -> SyncResult<()> {
        let bucket = self.bucket_mut(id)?;
        if bucket.is_income {
            return Err(SyncError::Validation(
                "The income bucket does not take allocations".into(),
            ));
        }
        bucket.set_allocation(month, amount);
        Ok(())
    }

    /// Hide a bucket from one month
    pub fn remove_from_month(&mut self, id: &BucketId, month: MonthKey) -> SyncResult<bool> {
        Ok(self.bucket_mut(id)?.remove_from_month(month))
    }

    /// Bring a hidden bucket back into a month
    pub fn restore_to_month(&mut self, id: &BucketId, month: MonthKey) -> SyncResult<bool> {
        Ok(self.bucket_mut(id)?.restore_to_month(month))
    }

    /// Apply the carry-forward transition for `month`
    pub fn carry_forward(&mut self, month: MonthKey) -> usize {
        carry_forward(self.ledger, month)
    }

    /// Remaining amount for a bucket in a month
    pub fn remaining(&self, id: &BucketId, month: MonthKey) -> Money {
        remaining(&*self.ledger, id, month)
    }

    /// Overview of a month
    pub fn overview(&self, month: MonthKey) -> MonthOverview {
        month_overview(&*self.ledger, month)
    }

    fn bucket_mut(&mut self, id: &BucketId) -> SyncResult<&mut Bucket> {
        self.ledger
            .bucket_mut(id)
            .ok_or_else(|| SyncError::bucket_not_found(id.to_string()))
    }
}
