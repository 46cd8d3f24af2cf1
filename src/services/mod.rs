//! Service layer for budget-sync
//!
//! The service layer holds the ledger's mutation rules: bucket and
//! allocation management, the monthly carry-forward, transaction lifecycle,
//! and active-month navigation.

pub mod budget;
pub mod period;
pub mod transaction;

pub use budget::{carry_forward, month_overview, remaining, BudgetService, MonthOverview};
pub use period::MonthCursor;
pub use transaction::TransactionService;
