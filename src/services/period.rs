//! Active month navigation
//!
//! The active month is an offset from an anchor month (normally the current
//! calendar month). Every time the cursor lands on a new month, the
//! carry-forward transition runs for it so the ledger is ready for the next
//! save.

use crate::error::{SyncError, SyncResult};
use crate::models::{Ledger, MonthKey};

use super::budget::carry_forward;

/// Navigable pointer to the active budget month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    anchor: MonthKey,
    offset: i32,
    active: MonthKey,
}

impl MonthCursor {
    /// Cursor anchored at `anchor` with zero offset
    pub fn new(anchor: MonthKey) -> Self {
        Self {
            anchor,
            offset: 0,
            active: anchor,
        }
    }

    /// Cursor anchored at the current calendar month
    pub fn current() -> Self {
        Self::new(MonthKey::current())
    }

    /// Offset from the anchor month
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// The active month
    pub fn active_month(&self) -> MonthKey {
        self.active
    }

    /// Jump to an absolute offset and derive allocations for the new month.
    /// Returns the number of allocation entries created.
    ///
    /// An offset that lands outside years 0000..=9999 is a validation error
    /// and leaves both the cursor and the ledger unchanged.
    pub fn set_offset(&mut self, ledger: &mut Ledger, offset: i32) -> SyncResult<usize> {
        let month = self.anchor.offset(offset).ok_or_else(|| {
            SyncError::Validation(format!(
                "month offset {} from {} is out of range",
                offset, self.anchor
            ))
        })?;
        let previous = self.active;
        self.offset = offset;
        self.active = month;
        if month == previous {
            return Ok(0);
        }
        let created = carry_forward(ledger, month);
        tracing::debug!(%month, created, "active month changed");
        Ok(created)
    }

    /// Move one month forward
    pub fn next(&mut self, ledger: &mut Ledger) -> SyncResult<usize> {
        let offset = self.step(1)?;
        self.set_offset(ledger, offset)
    }

    /// Move one month back
    pub fn prev(&mut self, ledger: &mut Ledger) -> SyncResult<usize> {
        let offset = self.step(-1)?;
        self.set_offset(ledger, offset)
    }

    fn step(&self, delta: i32) -> SyncResult<i32> {
        self.offset
            .checked_add(delta)
            .ok_or_else(|| SyncError::Validation("month offset overflow".into()))
    }

    /// Run the transition for the current active month without moving.
    /// Used after loading a ledger.
    pub fn refresh(&self, ledger: &mut Ledger) -> usize {
        carry_forward(ledger, self.active)
    }
}
