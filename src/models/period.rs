//! Budget period representation
//!
//! One budget cycle, anchored on the configured first day of the month. With
//! an anchor of 1 a period is a calendar month; with any other anchor it runs
//! from the anchor day of one month to the day before the anchor day of the
//! next. This is the only place boundary arithmetic lives; the snapshot and
//! the history rollup both resolve periods through it so live and historical
//! views can never drift apart.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A budget cycle with inclusive start and end dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BudgetPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl BudgetPeriod {
    /// Get the period containing `date` for the given anchor day
    ///
    /// `first_day` must already be validated to 1-28; every month has those
    /// days, so the anchor date always exists.
    pub fn containing(date: NaiveDate, first_day: u32) -> Self {
        let start = if date.day() >= first_day {
            anchor(date.year(), date.month(), first_day)
        } else {
            let (year, month) = previous_month(date.year(), date.month());
            anchor(year, month, first_day)
        };

        let (next_year, next_month) = next_month(start.year(), start.month());
        let end = anchor(next_year, next_month, first_day) - Duration::days(1);

        Self { start, end }
    }

    /// Inclusive first day of the period
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Inclusive last day of the period
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Stable key for grouping and display, `YYYY-MM` of the start date
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }

    /// Check if a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the period
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// 1-based index of `date` within the period
    ///
    /// Dates before the start count as day 1; dates after the end are clamped
    /// to the last day, so day arithmetic stays defined past the boundary.
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        ((date - self.start).num_days() + 1).clamp(1, self.num_days())
    }

    /// The period immediately after this one
    pub fn next(&self) -> Self {
        Self::containing(self.end + Duration::days(1), self.start.day())
    }

    /// The period immediately before this one
    pub fn prev(&self) -> Self {
        Self::containing(self.start - Duration::days(1), self.start.day())
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

fn anchor(year: i32, month: u32, day: u32) -> NaiveDate {
    // day is 1-28, valid in every month
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid anchor {}-{}-{}", year, month, day))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
