//! Point-in-time budget snapshot
//!
//! The snapshot is the live dashboard's view of the current budget cycle:
//! total spent, what is left, and a safe daily allowance for the remaining
//! days. It is recomputed from scratch on every call; nothing here is cached
//! or persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::BudgetConfig;
use crate::models::{BudgetPeriod, Expense, Money};

/// Derived figures for the budget period containing `today`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    /// The period the figures cover
    pub period: BudgetPeriod,

    /// Sum of all in-period expense amounts
    pub total_spent: Money,

    /// `monthly_amount - total_spent`; negative when over budget
    pub remaining: Money,

    /// Spend as a percentage of the budget; 0 when the budget is unset
    pub percent_spent: f64,

    /// Days left in the period including today, always at least 1
    pub remaining_days: i64,

    /// Remaining budget spread over the remaining days, clamped to zero
    ///
    /// Never use this to detect overspend; `is_over_budget` is the
    /// authoritative signal.
    pub daily_allowance: Money,

    /// Whether spending has exceeded the configured budget
    pub is_over_budget: bool,

    /// Set when `monthly_amount` is zero or negative
    pub budget_unset: bool,

    /// Set when the ledger store could not be queried and the totals are
    /// placeholders rather than real figures
    pub ledger_unknown: bool,
}

impl BudgetSnapshot {
    /// Compute a snapshot from the expense list, configuration, and date
    ///
    /// Pure and total: expenses outside the resolved period are ignored, an
    /// unset budget degrades to a flagged state, and the result is the same
    /// for the same inputs no matter how often or concurrently it runs.
    pub fn compute(expenses: &[Expense], config: &BudgetConfig, today: NaiveDate) -> Self {
        let period = BudgetPeriod::containing(today, config.first_day_of_month);

        let total_spent: Money = expenses
            .iter()
            .filter(|e| period.contains(e.date))
            .map(|e| e.amount)
            .sum();

        Self::from_total(period, total_spent, config, today, false)
    }

    /// Placeholder snapshot for when the ledger store is unavailable
    ///
    /// Period bounds and day counts are still real; spend figures are zeroed
    /// and `ledger_unknown` is set so consumers can render a degraded view
    /// instead of an error.
    pub fn unknown(config: &BudgetConfig, today: NaiveDate) -> Self {
        let period = BudgetPeriod::containing(today, config.first_day_of_month);
        Self::from_total(period, Money::zero(), config, today, true)
    }

    fn from_total(
        period: BudgetPeriod,
        total_spent: Money,
        config: &BudgetConfig,
        today: NaiveDate,
        ledger_unknown: bool,
    ) -> Self {
        let budget_unset = !config.is_budget_set();
        let remaining = config.monthly_amount - total_spent;
        let percent_spent = total_spent.percent_of(config.monthly_amount);

        let remaining_days = (period.num_days() - period.day_index(today) + 1).max(1);

        let daily_allowance = if remaining.is_negative() {
            Money::zero()
        } else {
            remaining.per_day(remaining_days)
        };

        Self {
            period,
            total_spent,
            remaining,
            percent_spent,
            remaining_days,
            daily_allowance,
            is_over_budget: total_spent > config.monthly_amount,
            budget_unset,
            ledger_unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseCategory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(rupees: i64, category: ExpenseCategory, on: NaiveDate) -> Expense {
        Expense::new(Money::from_rupees(rupees), category, on).unwrap()
    }

    fn config(rupees: i64) -> BudgetConfig {
        BudgetConfig {
            monthly_amount: Money::from_rupees(rupees),
            ..BudgetConfig::default()
        }
    }

    #[test]
    fn test_mid_month_snapshot() {
        // ₹4000 budget, ₹500 + ₹1200 spent, day 15 of a 30-day month
        let expenses = vec![
            expense(500, ExpenseCategory::Food, date(2025, 4, 3)),
            expense(1200, ExpenseCategory::Travel, date(2025, 4, 10)),
        ];

        let snapshot = BudgetSnapshot::compute(&expenses, &config(4000), date(2025, 4, 15));

        assert_eq!(snapshot.total_spent, Money::from_rupees(1700));
        assert_eq!(snapshot.remaining, Money::from_rupees(2300));
        assert_eq!(snapshot.remaining_days, 16);
        assert_eq!(snapshot.daily_allowance, Money::from_paise(14375)); // ₹143.75
        assert!((snapshot.percent_spent - 42.5).abs() < 1e-9);
        assert!(!snapshot.is_over_budget);
        assert!(!snapshot.budget_unset);
        assert!(!snapshot.ledger_unknown);
    }

    #[test]
    fn test_over_budget() {
        let expenses = vec![expense(4500, ExpenseCategory::Misc, date(2025, 4, 5))];

        let snapshot = BudgetSnapshot::compute(&expenses, &config(4000), date(2025, 4, 10));

        assert_eq!(snapshot.remaining, Money::from_rupees(-500));
        assert!(snapshot.is_over_budget);
        // Allowance is clamped for display; overspend is carried separately
        assert_eq!(snapshot.daily_allowance, Money::zero());
    }

    #[test]
    fn test_out_of_period_expenses_ignored() {
        let expenses = vec![
            expense(100, ExpenseCategory::Food, date(2025, 3, 31)),
            expense(200, ExpenseCategory::Food, date(2025, 4, 2)),
            expense(300, ExpenseCategory::Food, date(2025, 5, 1)),
        ];

        let snapshot = BudgetSnapshot::compute(&expenses, &config(4000), date(2025, 4, 15));
        assert_eq!(snapshot.total_spent, Money::from_rupees(200));
    }

    #[test]
    fn test_anchored_period_boundary() {
        // Anchor on the 10th: an expense on the 9th belongs to the prior cycle
        let cfg = BudgetConfig {
            monthly_amount: Money::from_rupees(4000),
            first_day_of_month: 10,
            ..BudgetConfig::default()
        };
        let expenses = vec![
            expense(100, ExpenseCategory::Food, date(2025, 4, 9)),
            expense(200, ExpenseCategory::Food, date(2025, 4, 10)),
        ];

        let snapshot = BudgetSnapshot::compute(&expenses, &cfg, date(2025, 4, 20));
        assert_eq!(snapshot.total_spent, Money::from_rupees(200));
    }

    #[test]
    fn test_remaining_days_never_below_one() {
        let snapshot = BudgetSnapshot::compute(&[], &config(4000), date(2025, 4, 30));
        assert_eq!(snapshot.remaining_days, 1);
        assert_eq!(snapshot.daily_allowance, Money::from_rupees(4000));
    }

    #[test]
    fn test_unset_budget_degrades() {
        let expenses = vec![expense(300, ExpenseCategory::Food, date(2025, 4, 2))];
        let snapshot = BudgetSnapshot::compute(&expenses, &config(0), date(2025, 4, 15));

        assert!(snapshot.budget_unset);
        assert_eq!(snapshot.percent_spent, 0.0);
        assert_eq!(snapshot.total_spent, Money::from_rupees(300));
        // remaining is still the signed arithmetic result
        assert_eq!(snapshot.remaining, Money::from_rupees(-300));
        assert_eq!(snapshot.daily_allowance, Money::zero());
    }

    #[test]
    fn test_unknown_snapshot() {
        let snapshot = BudgetSnapshot::unknown(&config(4000), date(2025, 4, 15));
        assert!(snapshot.ledger_unknown);
        assert_eq!(snapshot.total_spent, Money::zero());
        assert_eq!(snapshot.period.start(), date(2025, 4, 1));
        assert_eq!(snapshot.remaining_days, 16);
    }

    #[test]
    fn test_deterministic() {
        let expenses = vec![expense(500, ExpenseCategory::Food, date(2025, 4, 3))];
        let cfg = config(4000);
        let a = BudgetSnapshot::compute(&expenses, &cfg, date(2025, 4, 15));
        let b = BudgetSnapshot::compute(&expenses, &cfg, date(2025, 4, 15));
        assert_eq!(a, b);
    }
}
