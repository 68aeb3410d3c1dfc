//! Monthly history rollup
//!
//! Groups a user's full expense history into per-period reports with category
//! subtotals, most recent period first. The rollup is rebuilt from scratch
//! whenever the record set changes; at expected data volumes a full single
//! pass is cheaper than maintaining an incremental index.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::BudgetConfig;
use crate::models::{BudgetPeriod, Expense, ExpenseCategory, Money};

/// Aggregated figures for one historical budget period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Stable `YYYY-MM` key of the period start
    pub period_key: String,

    /// The period the report covers
    pub period: BudgetPeriod,

    /// Budget in force for the period
    pub budget: Money,

    /// Sum of all expenses in the period
    pub total_spent: Money,

    /// `budget - total_spent`; negative when the period went over budget
    pub saved: Money,

    /// Per-category subtotals; only categories with spend appear, and the
    /// values always sum to `total_spent`
    pub category_breakdown: BTreeMap<ExpenseCategory, Money>,

    /// The period's expenses, ordered by date descending
    pub expenses: Vec<Expense>,
}

impl MonthlyReport {
    /// Whether the period ended at or under budget
    pub fn is_saved(&self) -> bool {
        !self.saved.is_negative()
    }
}

/// Build the full per-period history for an expense list
///
/// Single pass over the history, accumulating the period total and each
/// category's subtotal simultaneously. Periods with no expenses are omitted
/// entirely; absence means zero spend, not an explicit zero entry. Repeated
/// calls over the same input yield an identical sequence.
pub fn build_history(expenses: &[Expense], config: &BudgetConfig) -> Vec<MonthlyReport> {
    struct Accum {
        period: BudgetPeriod,
        total: Money,
        breakdown: BTreeMap<ExpenseCategory, Money>,
        expenses: Vec<Expense>,
    }

    let mut by_period: HashMap<NaiveDate, Accum> = HashMap::new();

    for expense in expenses {
        let period = BudgetPeriod::containing(expense.date, config.first_day_of_month);
        let accum = by_period.entry(period.start()).or_insert_with(|| Accum {
            period,
            total: Money::zero(),
            breakdown: BTreeMap::new(),
            expenses: Vec::new(),
        });

        accum.total += expense.amount;
        *accum
            .breakdown
            .entry(expense.category)
            .or_insert_with(Money::zero) += expense.amount;
        accum.expenses.push(expense.clone());
    }

    let mut reports: Vec<MonthlyReport> = by_period
        .into_values()
        .map(|mut accum| {
            accum.expenses.sort_by(|a, b| b.date.cmp(&a.date));
            MonthlyReport {
                period_key: accum.period.key(),
                period: accum.period,
                budget: config.monthly_amount,
                total_spent: accum.total,
                saved: config.monthly_amount - accum.total,
                category_breakdown: accum.breakdown,
                expenses: accum.expenses,
            }
        })
        .collect();

    // Most recent period first
    reports.sort_by(|a, b| b.period.start().cmp(&a.period.start()));
    reports
}

/// Find the report for the period containing `date`, if any spend exists there
pub fn report_for_date(
    expenses: &[Expense],
    config: &BudgetConfig,
    date: NaiveDate,
) -> Option<MonthlyReport> {
    build_history(expenses, config)
        .into_iter()
        .find(|report| report.period.contains(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(rupees: i64, category: ExpenseCategory, on: NaiveDate) -> Expense {
        Expense::new(Money::from_rupees(rupees), category, on).unwrap()
    }

    fn config() -> BudgetConfig {
        BudgetConfig::default()
    }

    #[test]
    fn test_sparse_history_omits_empty_months() {
        // January and March only; February is omitted, not zero-filled
        let expenses = vec![
            expense(100, ExpenseCategory::Food, date(2025, 1, 5)),
            expense(200, ExpenseCategory::Travel, date(2025, 3, 12)),
        ];

        let history = build_history(&expenses, &config());

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].period_key, "2025-03");
        assert_eq!(history[1].period_key, "2025-01");
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let expenses = vec![
            expense(100, ExpenseCategory::Food, date(2025, 4, 1)),
            expense(250, ExpenseCategory::Food, date(2025, 4, 8)),
            expense(300, ExpenseCategory::Travel, date(2025, 4, 15)),
            expense(50, ExpenseCategory::Misc, date(2025, 4, 20)),
        ];

        let history = build_history(&expenses, &config());
        assert_eq!(history.len(), 1);

        let report = &history[0];
        assert_eq!(report.total_spent, Money::from_rupees(700));

        let breakdown_sum: Money = report.category_breakdown.values().copied().sum();
        assert_eq!(breakdown_sum, report.total_spent);

        assert_eq!(
            report.category_breakdown[&ExpenseCategory::Food],
            Money::from_rupees(350)
        );
        // Categories without spend do not appear
        assert!(!report
            .category_breakdown
            .contains_key(&ExpenseCategory::Stationery));
    }

    #[test]
    fn test_saved_may_be_negative() {
        let expenses = vec![expense(4500, ExpenseCategory::Misc, date(2025, 4, 2))];
        let history = build_history(&expenses, &config());

        assert_eq!(history[0].saved, Money::from_rupees(-500));
        assert!(!history[0].is_saved());
    }

    #[test]
    fn test_expenses_ordered_date_descending() {
        let expenses = vec![
            expense(10, ExpenseCategory::Food, date(2025, 4, 5)),
            expense(20, ExpenseCategory::Food, date(2025, 4, 25)),
            expense(30, ExpenseCategory::Food, date(2025, 4, 15)),
        ];

        let history = build_history(&expenses, &config());
        let dates: Vec<NaiveDate> = history[0].expenses.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 4, 25), date(2025, 4, 15), date(2025, 4, 5)]
        );
    }

    #[test]
    fn test_anchored_periods_match_snapshot_rule() {
        // Same boundary rule as the live snapshot: with anchor 10, Apr 9 and
        // Apr 10 land in different periods
        let cfg = BudgetConfig {
            first_day_of_month: 10,
            ..BudgetConfig::default()
        };
        let expenses = vec![
            expense(100, ExpenseCategory::Food, date(2025, 4, 9)),
            expense(200, ExpenseCategory::Food, date(2025, 4, 10)),
        ];

        let history = build_history(&expenses, &cfg);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].period.start(), date(2025, 4, 10));
        assert_eq!(history[1].period.start(), date(2025, 3, 10));
    }

    #[test]
    fn test_idempotent() {
        let expenses = vec![
            expense(100, ExpenseCategory::Food, date(2025, 1, 5)),
            expense(200, ExpenseCategory::Travel, date(2025, 3, 12)),
            expense(300, ExpenseCategory::Misc, date(2025, 3, 20)),
        ];

        let first = build_history(&expenses, &config());
        let second = build_history(&expenses, &config());
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_for_date() {
        let expenses = vec![expense(100, ExpenseCategory::Food, date(2025, 1, 5))];

        let hit = report_for_date(&expenses, &config(), date(2025, 1, 20));
        assert_eq!(hit.unwrap().period_key, "2025-01");

        // No spend in February, so no report either
        assert!(report_for_date(&expenses, &config(), date(2025, 2, 10)).is_none());
    }

    #[test]
    fn test_empty_history() {
        assert!(build_history(&[], &config()).is_empty());
    }
}
