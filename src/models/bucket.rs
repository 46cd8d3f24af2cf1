//! Bucket model
//!
//! A bucket is a named spending category with an allocation per month.
//! Exactly one bucket in a ledger is the income bucket; its allocations are
//! ignored by budgeting math.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::ids::BucketId;
use super::money::Money;
use super::month::MonthKey;

/// A budget bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Unique identifier
    pub id: BucketId,

    /// Display name
    pub name: String,

    /// Explicit allocation per month
    #[serde(default)]
    pub allocations: BTreeMap<MonthKey, Money>,

    /// Whether this is the ledger's income bucket
    #[serde(default)]
    pub is_income: bool,

    /// Months the bucket has been removed from
    #[serde(default)]
    pub deleted_months: BTreeSet<MonthKey>,

    /// Fields written by other clients, carried through unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Bucket {
    /// Create a new spending bucket with no allocations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BucketId::new(),
            name: name.into(),
            allocations: BTreeMap::new(),
            is_income: false,
            deleted_months: BTreeSet::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Create the income bucket
    pub fn income(name: impl Into<String>) -> Self {
        Self {
            is_income: true,
            ..Self::new(name)
        }
    }

    /// Builder-style helper to seed an allocation
    pub fn with_allocation(mut self, month: MonthKey, amount: Money) -> Self {
        self.allocations.insert(month, amount);
        self
    }

    /// Explicit allocation for a month, if any
    pub fn allocation(&self, month: MonthKey) -> Option<Money> {
        self.allocations.get(&month).copied()
    }

    /// Set the allocation for a month, restoring the bucket to that month
    pub fn set_allocation(&mut self, month: MonthKey, amount: Money) {
        self.allocations.insert(month, amount);
        self.deleted_months.remove(&month);
    }

    /// A bucket is active in a month iff it has an allocation entry there and
    /// has not been removed from that month
    pub fn is_active(&self, month: MonthKey) -> bool {
        self.allocations.contains_key(&month) && !self.deleted_months.contains(&month)
    }

    /// The most recent explicit allocation strictly before `month`
    pub fn latest_allocation_before(&self, month: MonthKey) -> Option<(MonthKey, Money)> {
        self.allocations
            .range(..month)
            .next_back()
            .map(|(m, amount)| (*m, *amount))
    }

    /// Earliest month with an explicit allocation
    pub fn first_month(&self) -> Option<MonthKey> {
        self.allocations.keys().next().copied()
    }

    /// Hide the bucket from a month without touching its allocation history
    pub fn remove_from_month(&mut self, month: MonthKey) -> bool {
        self.deleted_months.insert(month)
    }

    /// Undo `remove_from_month`
    pub fn restore_to_month(&mut self, month: MonthKey) -> bool {
        self.deleted_months.remove(&month)
    }

    /// Validate the bucket
    pub fn validate(&self) -> Result<(), BucketValidationError> {
        if self.name.trim().is_empty() {
            return Err(BucketValidationError::EmptyName);
        }
        if self.id.as_str().is_empty() {
            return Err(BucketValidationError::EmptyId);
        }
        Ok(())
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_income {
            write!(f, "{} (income)", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Validation errors for buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketValidationError {
    EmptyName,
    EmptyId,
}

impl fmt::Display for BucketValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Bucket name cannot be empty"),
            Self::EmptyId => write!(f, "Bucket id cannot be empty"),
        }
    }
}

impl std::error::Error for BucketValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r##"{"id": "b1", "name": "Travel", "allocations": {"2024-05": 120},
            "color": "#3366ff", "goal": {"target": 2000, "by": "2024-12"}}"##;
        let bucket: Bucket = serde_json::from_str(json).unwrap();
        assert_eq!(bucket.extra["color"], "#3366ff");

        let written = serde_json::to_value(&bucket).unwrap();
        assert_eq!(written["color"], "#3366ff");
        assert_eq!(written["goal"]["target"], 2000);
        assert_eq!(written["allocations"]["2024-05"], 120);
        assert!(written.get("extra").is_none());
    }

    fn month(s: &str) -> MonthKey {
        MonthKey::parse(s).unwrap()
    }

    #[test]
    fn test_new_bucket() {
        let bucket = Bucket::new("Groceries");
        assert_eq!(bucket.name, "Groceries");
        assert!(!bucket.is_income);
        assert!(bucket.allocations.is_empty());
        assert!(bucket.validate().is_ok());
    }

    #[test]
    fn test_active_requires_allocation_and_not_deleted() {
        let jan = month("2024-01");
        let mut bucket = Bucket::new("Rent").with_allocation(jan, Money::from_units(1200));

        assert!(bucket.is_active(jan));
        assert!(!bucket.is_active(month("2024-02")));

        bucket.remove_from_month(jan);
        assert!(!bucket.is_active(jan));
        assert_eq!(bucket.allocation(jan), Some(Money::from_units(1200)));

        bucket.restore_to_month(jan);
        assert!(bucket.is_active(jan));
    }

    #[test]
    fn test_set_allocation_restores_month() {
        let jan = month("2024-01");
        let mut bucket = Bucket::new("Fun");
        bucket.remove_from_month(jan);
        bucket.set_allocation(jan, Money::from_units(50));
        assert!(bucket.is_active(jan));
    }

    #[test]
    fn test_latest_allocation_before() {
        let bucket = Bucket::new("Gas")
            .with_allocation(month("2023-11"), Money::from_units(80))
            .with_allocation(month("2024-02"), Money::from_units(90));

        assert_eq!(bucket.latest_allocation_before(month("2023-11")), None);
        assert_eq!(
            bucket.latest_allocation_before(month("2024-02")),
            Some((month("2023-11"), Money::from_units(80)))
        );
        assert_eq!(
            bucket.latest_allocation_before(month("2024-06")),
            Some((month("2024-02"), Money::from_units(90)))
        );
    }

    #[test]
    fn test_optional_wire_fields_default() {
        let json = r#"{"id":"b1","name":"Dining","allocations":{"2024-01":150}}"#;
        let bucket: Bucket = serde_json::from_str(json).unwrap();

        assert!(!bucket.is_income);
        assert!(bucket.deleted_months.is_empty());
        assert_eq!(bucket.allocation(month("2024-01")), Some(Money::from_units(150)));
    }

    #[test]
    fn test_wire_field_names() {
        let mut bucket = Bucket::income("Paycheck");
        bucket.remove_from_month(month("2024-03"));
        let value = serde_json::to_value(&bucket).unwrap();

        assert_eq!(value["isIncome"], true);
        assert_eq!(value["deletedMonths"], serde_json::json!(["2024-03"]));
    }

    #[test]
    fn test_validation() {
        let bucket = Bucket::new("  ");
        assert_eq!(bucket.validate(), Err(BucketValidationError::EmptyName));
    }
}
