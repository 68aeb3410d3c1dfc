//! Custom error types for the budget engine
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for budget engine operations
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Validation errors for data models (bad amounts, bad dates, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Budget configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The ledger store could not be queried or subscribed to
    #[error("Ledger unavailable: {0}")]
    Ledger(String),

    /// A notification could not be delivered (non-fatal)
    #[error("Notification delivery failed: {0}")]
    Notification(String),

    /// The live change feed was closed by the store
    #[error("Change feed closed")]
    FeedClosed,
}

impl BudgetError {
    /// Create a validation error for a non-positive expense amount
    pub fn invalid_amount(amount: impl std::fmt::Display) -> Self {
        Self::Validation(format!("Expense amount must be positive, got {}", amount))
    }

    /// Create a configuration error for a first-day-of-month outside 1-28
    ///
    /// Days 29-31 do not exist in every month, which would make the period
    /// boundary ambiguous, so they are rejected at configuration time.
    pub fn ambiguous_first_day(day: u32) -> Self {
        Self::Config(format!(
            "First day of month must be between 1 and 28, got {}",
            day
        ))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from the ledger store
    pub fn is_ledger(&self) -> bool {
        matches!(self, Self::Ledger(_))
    }
}

/// Result type alias for budget engine operations
pub type BudgetResult<T> = Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BudgetError::Ledger("connection refused".into());
        assert_eq!(err.to_string(), "Ledger unavailable: connection refused");
        assert!(err.is_ledger());
    }

    #[test]
    fn test_invalid_amount() {
        let err = BudgetError::invalid_amount("-5");
        assert_eq!(
            err.to_string(),
            "Validation error: Expense amount must be positive, got -5"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_ambiguous_first_day() {
        let err = BudgetError::ambiguous_first_day(31);
        assert_eq!(
            err.to_string(),
            "Configuration error: First day of month must be between 1 and 28, got 31"
        );
    }
}
