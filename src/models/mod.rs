//! Core data models for the budget engine
//!
//! This module contains the data structures the aggregation pipeline reads
//! and derives: expense records, money, categories, and budget periods.

pub mod category;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;

pub use category::ExpenseCategory;
pub use expense::Expense;
pub use ids::{ExpenseId, UserId};
pub use money::Money;
pub use period::BudgetPeriod;
