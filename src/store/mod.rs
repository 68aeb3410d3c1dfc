//! External store interfaces
//!
//! The engine never owns expense records or configuration; it reads them
//! through these traits. The ledger store also exposes a per-user change
//! feed that the live coordinator subscribes to. Scoping the feed to the
//! authenticated user is the store's responsibility.

pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::config::{BudgetConfig, BudgetConfigPatch};
use crate::error::BudgetResult;
use crate::models::{Expense, ExpenseId, UserId};

pub use memory::{MemoryConfigStore, MemoryLedger};

/// Inclusive date range filter for ledger queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// A change to a user's expense records
///
/// The ledger is append/delete-only; records are never edited in place.
/// Consumers treat any event as "the record set changed" and re-read it,
/// so the payload is just the affected id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    Added(ExpenseId),
    Deleted(ExpenseId),
}

/// Receiving half of a user's change feed
///
/// Dropping the receiver unsubscribes; the store drops its sending half when
/// it notices the channel is closed.
pub type ChangeReceiver = mpsc::Receiver<ChangeEvent>;

/// Read access to a user's expense records
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch a user's expenses, newest first, optionally limited to a range
    async fn query(&self, user: UserId, range: Option<DateRange>) -> BudgetResult<Vec<Expense>>;

    /// Subscribe to the user's change feed
    async fn subscribe(&self, user: UserId) -> BudgetResult<ChangeReceiver>;
}

/// Read/write access to a user's budget configuration
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the user's configuration, falling back to defaults for new users
    async fn get_budget_config(&self, user: UserId) -> BudgetResult<BudgetConfig>;

    /// Apply a partial update and return the stored result
    async fn update_budget_config(
        &self,
        user: UserId,
        patch: BudgetConfigPatch,
    ) -> BudgetResult<BudgetConfig>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        );
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()));
    }
}
