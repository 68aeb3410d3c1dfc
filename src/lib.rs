//! Pocket Budget - budget aggregation and reporting engine
//!
//! This library turns a student's raw expense records (owned by an external
//! ledger store) into derived budget figures: what's left this month, a safe
//! daily spending allowance, threshold notifications, and per-month history
//! broken down by category. All derived values are recomputed on demand from
//! the current record set; nothing here is persisted.
//!
//! # Architecture
//!
//! - `models`: expense records, money, categories, and budget periods
//! - `config`: per-user budget configuration and validation
//! - `reports`: the live snapshot and the monthly history rollup (pure)
//! - `notify`: threshold-crossing notifications and delivery sinks
//! - `store`: traits for the external ledger and config stores, plus
//!   in-memory implementations
//! - `live`: the coordinator that re-drives the pipeline on change events
//! - `error`: custom error types
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use pocket_budget::config::BudgetConfig;
//! use pocket_budget::models::{Expense, ExpenseCategory, Money};
//! use pocket_budget::reports::BudgetSnapshot;
//!
//! let expenses = vec![
//!     Expense::new(
//!         Money::from_rupees(500),
//!         ExpenseCategory::Food,
//!         NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
//!     )
//!     .unwrap(),
//! ];
//!
//! let snapshot = BudgetSnapshot::compute(
//!     &expenses,
//!     &BudgetConfig::default(),
//!     NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
//! );
//! assert_eq!(snapshot.total_spent, Money::from_rupees(500));
//! ```

pub mod config;
pub mod error;
pub mod live;
pub mod models;
pub mod notify;
pub mod reports;
pub mod store;

pub use error::{BudgetError, BudgetResult};
