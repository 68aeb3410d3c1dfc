//! Derived reports
//!
//! Everything in this module is an ephemeral, read-through view computed from
//! the current expense list and configuration. Nothing is mutated in place or
//! persisted; callers recompute on demand.

pub mod monthly;
pub mod snapshot;

pub use monthly::{build_history, report_for_date, MonthlyReport};
pub use snapshot::BudgetSnapshot;
