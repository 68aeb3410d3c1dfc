//! Expense records
//!
//! Expenses are owned by the ledger store and read-only to this crate. The
//! constructor still validates the amount so test fixtures and in-memory
//! stores cannot produce records the store itself would have rejected.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BudgetError, BudgetResult};

use super::{ExpenseCategory, ExpenseId, Money};

/// A single dated expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier, minted by the ledger store
    pub id: ExpenseId,

    /// Amount spent; always positive
    pub amount: Money,

    /// Category of the expense
    pub category: ExpenseCategory,

    /// Calendar date of the expense, no time-of-day
    pub date: NaiveDate,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Reference to an uploaded receipt, opaque to this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

impl Expense {
    /// Create a new expense record
    ///
    /// Rejects non-positive amounts; zero and negative values never reach the
    /// aggregation pipeline.
    pub fn new(amount: Money, category: ExpenseCategory, date: NaiveDate) -> BudgetResult<Self> {
        if !amount.is_positive() {
            return Err(BudgetError::invalid_amount(amount));
        }

        Ok(Self {
            id: ExpenseId::new(),
            amount,
            category,
            date,
            notes: None,
            receipt_url: None,
        })
    }

    /// Attach notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach a receipt reference
    pub fn with_receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }

    /// Validate an already-constructed record (e.g. after deserialization)
    pub fn validate(&self) -> BudgetResult<()> {
        if !self.amount.is_positive() {
            return Err(BudgetError::invalid_amount(self.amount));
        }
        Ok(())
    }
}
