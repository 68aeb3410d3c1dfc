//! Budget configuration
//!
//! Per-user settings for the budget engine: the monthly amount, where the
//! budget cycle starts, and which spend thresholds raise notifications.
//! Persistence is owned by the external config store; this module only
//! defines the value and its validation rules.

use serde::{Deserialize, Serialize};

use crate::error::{BudgetError, BudgetResult};
use crate::models::Money;

/// A user's budget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Total budget for one period
    pub monthly_amount: Money,

    /// Day of the month the budget cycle starts on (1-28)
    #[serde(default = "default_first_day")]
    pub first_day_of_month: u32,

    /// Percent-of-budget trigger points for notifications
    #[serde(default = "default_thresholds")]
    pub notification_thresholds: Vec<u8>,

    /// Whether threshold alerts are pushed to the device
    #[serde(default = "default_push")]
    pub push_notifications: bool,

    /// Whether threshold alerts are also sent by email
    #[serde(default)]
    pub email_notifications: bool,
}

fn default_first_day() -> u32 {
    1
}

fn default_thresholds() -> Vec<u8> {
    vec![50, 90]
}

fn default_push() -> bool {
    true
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            monthly_amount: Money::from_rupees(4000),
            first_day_of_month: default_first_day(),
            notification_thresholds: default_thresholds(),
            push_notifications: default_push(),
            email_notifications: false,
        }
    }
}

impl BudgetConfig {
    /// Validate the configuration
    ///
    /// The monthly amount is allowed to be unset (zero or negative); the
    /// snapshot degrades to a flagged state instead of failing. The first day
    /// and thresholds are hard-validated because bad values there would make
    /// period boundaries or alerts meaningless.
    pub fn validate(&self) -> BudgetResult<()> {
        if !(1..=28).contains(&self.first_day_of_month) {
            return Err(BudgetError::ambiguous_first_day(self.first_day_of_month));
        }

        if self.notification_thresholds.iter().any(|&t| t == 0) {
            return Err(BudgetError::Config(
                "Notification thresholds must be positive percentages".into(),
            ));
        }

        Ok(())
    }

    /// Whether a usable monthly budget has been configured
    pub fn is_budget_set(&self) -> bool {
        self.monthly_amount.is_positive()
    }

    /// Thresholds sorted ascending with duplicates removed
    pub fn thresholds(&self) -> Vec<u8> {
        let mut thresholds = self.notification_thresholds.clone();
        thresholds.sort_unstable();
        thresholds.dedup();
        thresholds
    }

    /// Apply a partial update, validating the result
    pub fn apply(&self, patch: BudgetConfigPatch) -> BudgetResult<Self> {
        let updated = Self {
            monthly_amount: patch.monthly_amount.unwrap_or(self.monthly_amount),
            first_day_of_month: patch.first_day_of_month.unwrap_or(self.first_day_of_month),
            notification_thresholds: patch
                .notification_thresholds
                .unwrap_or_else(|| self.notification_thresholds.clone()),
            push_notifications: patch.push_notifications.unwrap_or(self.push_notifications),
            email_notifications: patch
                .email_notifications
                .unwrap_or(self.email_notifications),
        };
        updated.validate()?;
        Ok(updated)
    }
}

/// A partial configuration update, mirroring the settings form
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_amount: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_day_of_month: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_thresholds: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
}

impl BudgetConfigPatch {
    /// Patch that only changes the monthly amount
    pub fn monthly_amount(amount: Money) -> Self {
        Self {
            monthly_amount: Some(amount),
            ..Self::default()
        }
    }

    /// Patch that only changes the first day of the budget cycle
    pub fn first_day(day: u32) -> Self {
        Self {
            first_day_of_month: Some(day),
            ..Self::default()
        }
    }
}
