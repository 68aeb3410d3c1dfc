//! Live update coordination
//!
//! Keeps a user's budget figures current while expense records change under
//! them. The coordinator subscribes to the ledger store's change feed,
//! coalesces bursts of events into a single recomputation over the latest
//! record set, evaluates threshold notifications, and publishes results
//! through watch channels so consumers only ever observe the newest values.
//!
//! Recomputation is cheap and runs to completion without suspending between
//! reads of shared state, so at most one is ever in flight per user; a change
//! arriving while the debounce window is open re-arms the window instead of
//! queueing a second computation. If the subscription fails or the feed is
//! severed, the coordinator retries with capped exponential back-off while
//! `refresh` remains available as an on-demand path that produces identical
//! results.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::config::BudgetConfig;
use crate::error::{BudgetError, BudgetResult};
use crate::models::UserId;
use crate::notify::{NotificationSink, NotifierState, ThresholdNotifier};
use crate::reports::{report_for_date, BudgetSnapshot, MonthlyReport};
use crate::store::{ChangeReceiver, ConfigStore, LedgerStore};

const COMMAND_CAPACITY: usize = 8;

/// Tuning knobs for the coordinator
#[derive(Clone)]
pub struct CoordinatorOptions {
    /// How long to wait after a change event before recomputing; further
    /// events inside the window re-arm it
    pub debounce: Duration,

    /// First delay between reconnection attempts
    pub initial_backoff: Duration,

    /// Upper bound for the reconnection delay
    pub max_backoff: Duration,

    /// Source of "today", injectable for tests
    pub today: Arc<dyn Fn() -> NaiveDate + Send + Sync>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(250),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            today: Arc::new(|| chrono::Local::now().date_naive()),
        }
    }
}

impl fmt::Debug for CoordinatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorOptions")
            .field("debounce", &self.debounce)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .finish_non_exhaustive()
    }
}

enum Command {
    Refresh,
    ViewPeriod(Option<NaiveDate>),
    Shutdown,
}

/// Handle to a running live update pipeline for one user
///
/// Dropping the handle closes the command channel, which stops the worker
/// task; all outputs are derived, non-persisted views, so cancellation at any
/// point leaves nothing behind.
pub struct LiveUpdateCoordinator {
    commands: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<BudgetSnapshot>,
    report_rx: watch::Receiver<Option<MonthlyReport>>,
    task: JoinHandle<()>,
}

impl LiveUpdateCoordinator {
    /// Start the pipeline for `user`
    ///
    /// Never fails: if the subscription cannot be established the worker
    /// keeps retrying in the background and `refresh` serves as the fallback
    /// path in the meantime. Until the first recomputation lands, the
    /// published snapshot is a flagged placeholder.
    pub async fn spawn(
        ledger: Arc<dyn LedgerStore>,
        configs: Arc<dyn ConfigStore>,
        sink: Arc<dyn NotificationSink>,
        user: UserId,
        opts: CoordinatorOptions,
    ) -> Self {
        let config = match configs.get_budget_config(user).await {
            Ok(config) => config,
            Err(err) => {
                warn!(%user, error = %err, "config fetch failed at startup; using defaults");
                BudgetConfig::default()
            }
        };

        let placeholder = BudgetSnapshot::unknown(&config, (opts.today)());
        let (snapshot_tx, snapshot_rx) = watch::channel(placeholder);
        let (report_tx, report_rx) = watch::channel(None);
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);

        let worker = Worker {
            ledger,
            configs,
            sink,
            user,
            opts,
            config,
            commands: command_rx,
            feed: None,
            viewed: None,
            notifier_state: NotifierState::default(),
            snapshot_tx,
            report_tx,
        };
        let task = tokio::spawn(worker.run());

        Self {
            commands,
            snapshot_rx,
            report_rx,
            task,
        }
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> BudgetSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch channel for snapshot updates
    pub fn watch_snapshot(&self) -> watch::Receiver<BudgetSnapshot> {
        self.snapshot_rx.clone()
    }

    /// The report for the currently viewed historical period, if any
    pub fn report(&self) -> Option<MonthlyReport> {
        self.report_rx.borrow().clone()
    }

    /// Watch channel for viewed-period report updates
    pub fn watch_report(&self) -> watch::Receiver<Option<MonthlyReport>> {
        self.report_rx.clone()
    }

    /// Force a recomputation from the latest record set
    ///
    /// The on-demand path: produces exactly what a healthy live feed would.
    pub async fn refresh(&self) -> BudgetResult<()> {
        self.send(Command::Refresh).await
    }

    /// Set (or clear) the historical period being viewed; the report for the
    /// period containing `date` is recomputed alongside every snapshot
    pub async fn view_period(&self, date: Option<NaiveDate>) -> BudgetResult<()> {
        self.send(Command::ViewPeriod(date)).await
    }

    /// Stop the pipeline and wait for the worker to finish
    pub async fn stop(self) {
        let _ = self.commands.send(Command::Shutdown).await;
        let _ = self.task.await;
    }

    async fn send(&self, command: Command) -> BudgetResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| BudgetError::FeedClosed)
    }
}

enum Coalesce {
    Compute,
    FeedClosed,
    Stop,
}

struct Worker {
    ledger: Arc<dyn LedgerStore>,
    configs: Arc<dyn ConfigStore>,
    sink: Arc<dyn NotificationSink>,
    user: UserId,
    opts: CoordinatorOptions,
    /// Last successfully fetched configuration, reused when the config store
    /// is briefly unreachable
    config: BudgetConfig,
    commands: mpsc::Receiver<Command>,
    feed: Option<ChangeReceiver>,
    viewed: Option<NaiveDate>,
    notifier_state: NotifierState,
    snapshot_tx: watch::Sender<BudgetSnapshot>,
    report_tx: watch::Sender<Option<MonthlyReport>>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let keep_going = match self.feed.take() {
                Some(feed) => self.connected(feed).await,
                None => self.reconnect().await,
            };
            if !keep_going {
                break;
            }
        }
        debug!(user = %self.user, "live update worker stopped");
    }

    /// Serve commands and change events while the feed is healthy.
    /// Returns false when shutdown was requested.
    async fn connected(&mut self, mut feed: ChangeReceiver) -> bool {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    if !self.handle_command(cmd).await {
                        return false;
                    }
                }
                event = feed.recv() => match event {
                    Some(_) => match self.coalesce(&mut feed).await {
                        Coalesce::Compute => self.recompute().await,
                        Coalesce::FeedClosed => {
                            // compute with what we already know, then reconnect
                            self.recompute().await;
                            warn!(user = %self.user, "change feed closed");
                            return true;
                        }
                        Coalesce::Stop => return false,
                    },
                    None => {
                        // publish what the store reports right now; if the
                        // outage also covers queries this flags the snapshot
                        // as unknown
                        self.recompute().await;
                        warn!(user = %self.user, "change feed closed");
                        return true;
                    }
                }
            }
        }
    }

    /// Absorb a burst of change events into one recomputation
    ///
    /// Each further event re-arms the debounce window; only the latest record
    /// set is ever read, so intermediate states are never replayed.
    async fn coalesce(&mut self, feed: &mut ChangeReceiver) -> Coalesce {
        let mut deadline = Instant::now() + self.opts.debounce;
        loop {
            tokio::select! {
                _ = time::sleep_until(deadline) => return Coalesce::Compute,
                event = feed.recv() => match event {
                    Some(_) => deadline = Instant::now() + self.opts.debounce,
                    None => return Coalesce::FeedClosed,
                },
                cmd = self.commands.recv() => match cmd {
                    None | Some(Command::Shutdown) => return Coalesce::Stop,
                    // an explicit refresh cuts the window short
                    Some(Command::Refresh) => return Coalesce::Compute,
                    Some(Command::ViewPeriod(date)) => self.viewed = date,
                }
            }
        }
    }

    /// Re-establish the change feed with capped exponential back-off.
    /// Commands keep being served between attempts, so the on-demand refresh
    /// path works throughout an outage. Returns false on shutdown.
    async fn reconnect(&mut self) -> bool {
        let mut backoff = self.opts.initial_backoff;
        loop {
            match self.ledger.subscribe(self.user).await {
                Ok(feed) => {
                    info!(user = %self.user, "change feed subscribed");
                    self.feed = Some(feed);
                    // catch up on anything that changed while disconnected
                    self.recompute().await;
                    return true;
                }
                Err(err) => {
                    warn!(
                        user = %self.user,
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "subscribe failed; will retry"
                    );
                }
            }

            tokio::select! {
                _ = time::sleep(backoff) => {}
                cmd = self.commands.recv() => {
                    if !self.handle_command(cmd).await {
                        return false;
                    }
                }
            }
            backoff = (backoff * 2).min(self.opts.max_backoff);
        }
    }

    async fn handle_command(&mut self, command: Option<Command>) -> bool {
        match command {
            None | Some(Command::Shutdown) => false,
            Some(Command::Refresh) => {
                self.recompute().await;
                true
            }
            Some(Command::ViewPeriod(date)) => {
                self.viewed = date;
                self.recompute().await;
                true
            }
        }
    }

    /// One full recomputation from the latest record set
    ///
    /// Runs to completion without suspending between reads of the record set,
    /// so consumers never observe a half-updated state.
    async fn recompute(&mut self) {
        let today = (self.opts.today)();

        match self.configs.get_budget_config(self.user).await {
            Ok(config) => self.config = config,
            Err(err) => {
                warn!(user = %self.user, error = %err, "config fetch failed; using last known config");
            }
        }
        let config = self.config.clone();

        let (snapshot, report) = match self.ledger.query(self.user, None).await {
            Ok(expenses) => {
                let snapshot = BudgetSnapshot::compute(&expenses, &config, today);
                let report = self
                    .viewed
                    .and_then(|date| report_for_date(&expenses, &config, date));
                (snapshot, report)
            }
            Err(err) => {
                warn!(user = %self.user, error = %err, "ledger query failed; publishing unknown snapshot");
                (BudgetSnapshot::unknown(&config, today), None)
            }
        };

        let notifier = ThresholdNotifier::new(&config);
        let (alerts, state) = notifier.evaluate(&snapshot, &self.notifier_state);
        self.notifier_state = state;

        if config.push_notifications || config.email_notifications {
            for alert in &alerts {
                // delivery failure never blocks recomputation
                if let Err(err) = self.sink.send(alert).await {
                    warn!(
                        user = %self.user,
                        sink = self.sink.name(),
                        threshold = alert.threshold,
                        error = %err,
                        "notification delivery failed"
                    );
                }
            }
        }

        // last-write-wins publication
        let _ = self.snapshot_tx.send(snapshot);
        let _ = self.report_tx.send(report);
    }
}
