//! In-memory store implementations
//!
//! Back the store traits with plain maps for tests, demos, and local use.
//! `MemoryLedger` can be switched into an unavailable state to exercise the
//! degraded ledger path, and its change feed can be severed to exercise
//! reconnection.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use crate::config::{BudgetConfig, BudgetConfigPatch};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{Expense, ExpenseId, UserId};

use super::{ChangeEvent, ChangeReceiver, ConfigStore, DateRange, LedgerStore};

const FEED_CAPACITY: usize = 64;

/// In-memory expense ledger with a working change feed
pub struct MemoryLedger {
    expenses: RwLock<HashMap<UserId, Vec<Expense>>>,
    subscribers: Mutex<HashMap<UserId, Vec<mpsc::Sender<ChangeEvent>>>>,
    unavailable: RwLock<bool>,
    feed_unavailable: RwLock<bool>,
    query_count: RwLock<u64>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            expenses: RwLock::new(HashMap::new()),
            subscribers: Mutex::new(HashMap::new()),
            unavailable: RwLock::new(false),
            feed_unavailable: RwLock::new(false),
            query_count: RwLock::new(0),
        }
    }

    /// Append an expense and notify the user's subscribers
    pub fn add_expense(&self, user: UserId, expense: Expense) {
        let id = expense.id;
        self.expenses.write().entry(user).or_default().push(expense);
        self.broadcast(user, ChangeEvent::Added(id));
    }

    /// Delete an expense and notify the user's subscribers
    pub fn delete_expense(&self, user: UserId, id: ExpenseId) {
        if let Some(list) = self.expenses.write().get_mut(&user) {
            list.retain(|e| e.id != id);
        }
        self.broadcast(user, ChangeEvent::Deleted(id));
    }

    /// Toggle the simulated outage; queries and subscriptions fail while set
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write() = unavailable;
    }

    /// Toggle a subscription-only outage; queries keep working so the
    /// on-demand refresh path can be exercised
    pub fn set_feed_unavailable(&self, unavailable: bool) {
        *self.feed_unavailable.write() = unavailable;
    }

    /// Drop all change feeds, as if the realtime connection was lost
    pub fn sever_feeds(&self) {
        self.subscribers.lock().clear();
    }

    /// Number of queries served, for asserting coalescing behavior in tests
    pub fn query_count(&self) -> u64 {
        *self.query_count.read()
    }

    fn broadcast(&self, user: UserId, event: ChangeEvent) {
        let mut subscribers = self.subscribers.lock();
        if let Some(senders) = subscribers.get_mut(&user) {
            // try_send: a full or closed feed must never block a write
            senders.retain(|tx| {
                !matches!(tx.try_send(event), Err(mpsc::error::TrySendError::Closed(_)))
            });
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LedgerStore for MemoryLedger {
    async fn query(&self, user: UserId, range: Option<DateRange>) -> BudgetResult<Vec<Expense>> {
        if *self.unavailable.read() {
            return Err(BudgetError::Ledger("store unavailable".into()));
        }
        *self.query_count.write() += 1;

        let mut result: Vec<Expense> = self
            .expenses
            .read()
            .get(&user)
            .map(|list| {
                list.iter()
                    .filter(|e| range.map_or(true, |r| r.contains(e.date)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        result.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(result)
    }

    async fn subscribe(&self, user: UserId) -> BudgetResult<ChangeReceiver> {
        if *self.unavailable.read() || *self.feed_unavailable.read() {
            return Err(BudgetError::Ledger("subscribe failed".into()));
        }

        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        self.subscribers.lock().entry(user).or_default().push(tx);
        Ok(rx)
    }
}

/// In-memory configuration store
pub struct MemoryConfigStore {
    configs: RwLock<HashMap<UserId, BudgetConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self {
            configs: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a user's configuration directly
    pub fn insert(&self, user: UserId, config: BudgetConfig) {
        self.configs.write().insert(user, config);
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get_budget_config(&self, user: UserId) -> BudgetResult<BudgetConfig> {
        Ok(self
            .configs
            .read()
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_budget_config(
        &self,
        user: UserId,
        patch: BudgetConfigPatch,
    ) -> BudgetResult<BudgetConfig> {
        let current = self.get_budget_config(user).await?;
        let updated = current.apply(patch)?;
        self.configs.write().insert(user, updated.clone());
        Ok(updated)
    }
}
