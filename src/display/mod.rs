//! Display formatting for terminal output

pub mod overview;
pub mod sync;

pub use overview::format_month_overview;
pub use sync::{format_ledger_summary, format_load_outcome};
