//! Expense categories
//!
//! The category set is fixed; the ledger store rejects anything outside it,
//! so aggregation can iterate the full set without a lookup table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a recorded expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Food,
    Stationery,
    Travel,
    Misc,
}

impl ExpenseCategory {
    /// All categories, in display order
    pub const ALL: [ExpenseCategory; 4] = [
        ExpenseCategory::Food,
        ExpenseCategory::Stationery,
        ExpenseCategory::Travel,
        ExpenseCategory::Misc,
    ];

    /// The category name as shown to users
    pub const fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Stationery => "Stationery",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Misc => "Misc",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(ExpenseCategory::Food),
            "stationery" => Ok(ExpenseCategory::Stationery),
            "travel" => Ok(ExpenseCategory::Travel),
            "misc" => Ok(ExpenseCategory::Misc),
            other => Err(format!("Unknown expense category: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ExpenseCategory::Food.to_string(), "Food");
        assert_eq!(ExpenseCategory::Misc.to_string(), "Misc");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "travel".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::Travel
        );
        assert_eq!(
            " Stationery ".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::Stationery
        );
        assert!("groceries".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_all_is_complete() {
        for category in ExpenseCategory::ALL {
            assert_eq!(
                category.as_str().parse::<ExpenseCategory>().unwrap(),
                category
            );
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ExpenseCategory::Food).unwrap();
        assert_eq!(json, "\"Food\"");
    }
}
