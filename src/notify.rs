//! Budget threshold notifications
//!
//! Watches successive snapshots and raises an alert the first time spending
//! crosses each configured percent-of-budget threshold within a period. The
//! watcher's whole state is the highest threshold already fired for the
//! period, so re-evaluating the same snapshot is a no-op and a rollover into
//! a new period starts fresh.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BudgetConfig;
use crate::error::BudgetResult;
use crate::reports::BudgetSnapshot;

/// A threshold crossing to be delivered to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAlert {
    /// The configured threshold that was crossed, in percent
    pub threshold: u8,

    /// Percent spent at the time of evaluation
    pub percent_spent: f64,

    /// Key of the period the alert belongs to
    pub period_key: String,
}

/// Per-(user, period) notifier state
///
/// Small and serde-serializable so callers that want alerts to survive a
/// reload can persist it next to their session; the engine itself keeps it
/// in memory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierState {
    /// Start date of the period the state belongs to
    pub period_start: Option<NaiveDate>,

    /// Highest threshold already fired this period
    pub highest_fired: Option<u8>,
}

impl NotifierState {
    /// Fresh state for a new period, nothing fired yet
    pub fn for_period(period_start: NaiveDate) -> Self {
        Self {
            period_start: Some(period_start),
            highest_fired: None,
        }
    }
}

/// Evaluates snapshots against a set of notification thresholds
#[derive(Debug, Clone)]
pub struct ThresholdNotifier {
    thresholds: Vec<u8>,
}

impl ThresholdNotifier {
    /// Build a notifier from the thresholds configured for the user
    pub fn new(config: &BudgetConfig) -> Self {
        Self {
            thresholds: config.thresholds(),
        }
    }

    /// Evaluate a snapshot, returning newly crossed thresholds and the state
    /// to carry into the next evaluation
    ///
    /// Each threshold fires at most once per period no matter how often new
    /// expenses stream in. When one update jumps past several unfired
    /// thresholds at once, all of them are returned in ascending order.
    /// A snapshot from a different period than the state resets it first.
    pub fn evaluate(
        &self,
        snapshot: &BudgetSnapshot,
        state: &NotifierState,
    ) -> (Vec<ThresholdAlert>, NotifierState) {
        let period_start = snapshot.period.start();

        let mut state = if state.period_start == Some(period_start) {
            state.clone()
        } else {
            NotifierState::for_period(period_start)
        };

        // Placeholder snapshots carry no real spend figures
        if snapshot.budget_unset || snapshot.ledger_unknown {
            return (Vec::new(), state);
        }

        let alerts: Vec<ThresholdAlert> = self
            .thresholds
            .iter()
            .filter(|&&t| {
                snapshot.percent_spent >= f64::from(t)
                    && state.highest_fired.map_or(true, |fired| t > fired)
            })
            .map(|&t| ThresholdAlert {
                threshold: t,
                percent_spent: snapshot.percent_spent,
                period_key: snapshot.period.key(),
            })
            .collect();

        if let Some(last) = alerts.last() {
            debug!(
                period = %last.period_key,
                highest = last.threshold,
                count = alerts.len(),
                "budget thresholds crossed"
            );
            state.highest_fired = Some(last.threshold);
        }

        (alerts, state)
    }
}

/// Delivery channel for threshold alerts
///
/// Delivery failures are reported but never block recomputation; the
/// coordinator logs and drops them.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a single alert
    async fn send(&self, alert: &ThresholdAlert) -> BudgetResult<()>;

    /// Channel name, for logging
    fn name(&self) -> &str;
}

/// In-memory sink that records delivered alerts, for tests and demos
pub struct MemorySink {
    name: String,
    delivered: parking_lot::Mutex<Vec<ThresholdAlert>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delivered: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// All alerts delivered so far, in delivery order
    pub fn delivered(&self) -> Vec<ThresholdAlert> {
        self.delivered.lock().clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for MemorySink {
    async fn send(&self, alert: &ThresholdAlert) -> BudgetResult<()> {
        self.delivered.lock().push(alert.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Expense, ExpenseCategory, Money};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot_at(spent_rupees: i64, today: NaiveDate) -> BudgetSnapshot {
        let expenses = if spent_rupees > 0 {
            vec![Expense::new(
                Money::from_rupees(spent_rupees),
                ExpenseCategory::Misc,
                today,
            )
            .unwrap()]
        } else {
            Vec::new()
        };
        BudgetSnapshot::compute(&expenses, &BudgetConfig::default(), today)
    }

    fn notifier() -> ThresholdNotifier {
        ThresholdNotifier::new(&BudgetConfig::default())
    }

    #[test]
    fn test_fires_once_per_threshold() {
        let notifier = notifier();
        let state = NotifierState::default();

        // 55% of the ₹4000 default budget
        let snapshot = snapshot_at(2200, date(2025, 4, 10));
        let (alerts, state) = notifier.evaluate(&snapshot, &state);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].threshold, 50);

        // Same snapshot again: idempotent re-entry
        let (again, state) = notifier.evaluate(&snapshot, &state);
        assert!(again.is_empty());
        assert_eq!(state.highest_fired, Some(50));
    }

    #[test]
    fn test_jump_fires_all_crossed_in_ascending_order() {
        let notifier = notifier();
        let state = NotifierState::default();

        // 30% first
        let (alerts, state) = notifier.evaluate(&snapshot_at(1200, date(2025, 4, 10)), &state);
        assert!(alerts.is_empty());

        // Straight to 95%: both 50 and 90 fire, 50 first
        let (alerts, state) = notifier.evaluate(&snapshot_at(3800, date(2025, 4, 12)), &state);
        let fired: Vec<u8> = alerts.iter().map(|a| a.threshold).collect();
        assert_eq!(fired, vec![50, 90]);
        assert_eq!(state.highest_fired, Some(90));
    }

    #[test]
    fn test_period_rollover_resets_state() {
        let notifier = notifier();
        let state = NotifierState::default();

        let (_, state) = notifier.evaluate(&snapshot_at(3800, date(2025, 4, 12)), &state);
        assert_eq!(state.highest_fired, Some(90));

        // New period, fresh state: the 50% alert fires again for May
        let (alerts, state) = notifier.evaluate(&snapshot_at(2200, date(2025, 5, 2)), &state);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].period_key, "2025-05");
        assert_eq!(state.highest_fired, Some(50));
        assert_eq!(state.period_start, Some(date(2025, 5, 1)));
    }

    #[test]
    fn test_no_alerts_for_degraded_snapshots() {
        let notifier = notifier();
        let state = NotifierState::default();

        let unknown = BudgetSnapshot::unknown(&BudgetConfig::default(), date(2025, 4, 10));
        let (alerts, _) = notifier.evaluate(&unknown, &state);
        assert!(alerts.is_empty());

        let unset_config = BudgetConfig {
            monthly_amount: Money::zero(),
            ..BudgetConfig::default()
        };
        let snapshot = BudgetSnapshot::compute(&[], &unset_config, date(2025, 4, 10));
        let (alerts, _) = notifier.evaluate(&snapshot, &state);
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_memory_sink_records_order() {
        let sink = MemorySink::new("test");
        let alert = ThresholdAlert {
            threshold: 50,
            percent_spent: 55.0,
            period_key: "2025-04".into(),
        };
        sink.send(&alert).await.unwrap();
        assert_eq!(sink.delivered(), vec![alert]);
        assert_eq!(sink.name(), "test");
    }
}
