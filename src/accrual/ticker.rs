//! Timer task driving an [`AccrualEstimator`].
//!
//! The task owns the estimator. Reconciliations reach it over a channel and
//! are handled before any pending tick, so an authoritative value always
//! replaces the running estimate. Every change is published on a `watch`
//! channel.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::{AccrualEstimator, PendingRewardEstimate};
use crate::config::AccrualSettings;
use crate::reader::NftRewardRecord;

struct Running {
    reconciles: mpsc::UnboundedSender<Vec<NftRewardRecord>>,
    handle: JoinHandle<()>,
}

/// Live pending-rewards estimate with an explicit `start()`/`stop()` lifecycle.
///
/// Dropping the ticker stops its task.
pub struct AccrualTicker {
    settings: AccrualSettings,
    period: Duration,
    published: Arc<watch::Sender<PendingRewardEstimate>>,
    records: Mutex<Vec<NftRewardRecord>>,
    running: Mutex<Option<Running>>,
}

impl AccrualTicker {
    pub fn new(settings: AccrualSettings, period: Duration) -> Self {
        let (published, _) = watch::channel(PendingRewardEstimate::default());
        Self {
            settings,
            period,
            published: Arc::new(published),
            records: Mutex::new(Vec::new()),
            running: Mutex::new(None),
        }
    }

    /// Spawns the ticking task, seeded with the last reconciled records.
    ///
    /// Must be called from within a tokio runtime. Does nothing if the task is
    /// already running.
    pub fn start(&self) {
        let mut running = lock(&self.running);
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return;
        }

        let mut estimator = AccrualEstimator::new(self.settings.clone());
        self.published
            .send_replace(estimator.reconcile(&lock(&self.records)));

        let (reconciles, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(estimator, receiver, self.published.clone(), self.period));
        *running = Some(Running { reconciles, handle });

        tracing::debug!("Accrual ticker started: period_ms={}", self.period.as_millis());
    }

    /// Stops the task. The published value stays at its last state.
    pub fn stop(&self) {
        if let Some(running) = lock(&self.running).take() {
            running.handle.abort();
            tracing::debug!("Accrual ticker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.running)
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Hands fresh on-chain records to the estimator.
    ///
    /// Without a live task the authoritative value is published directly, and
    /// the records also seed the next `start()`.
    pub fn reconcile(&self, records: &[NftRewardRecord]) {
        *lock(&self.records) = records.to_vec();
        let delivered = lock(&self.running).as_ref().is_some_and(|running| {
            !running.handle.is_finished() && running.reconciles.send(records.to_vec()).is_ok()
        });
        if !delivered {
            let mut estimator = AccrualEstimator::new(self.settings.clone());
            self.published.send_replace(estimator.reconcile(records));
        }
    }

    /// The live estimate, or the last authoritative value if not running.
    pub fn current(&self) -> PendingRewardEstimate {
        let state = *self.published.borrow();
        if self.is_running() {
            state
        } else {
            PendingRewardEstimate {
                estimate: state.authoritative,
                ..state
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PendingRewardEstimate> {
        self.published.subscribe()
    }
}

impl Drop for AccrualTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run(
    mut estimator: AccrualEstimator,
    mut reconciles: mpsc::UnboundedReceiver<Vec<NftRewardRecord>>,
    published: Arc<watch::Sender<PendingRewardEstimate>>,
    period: Duration,
) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;
    let mut last = Instant::now();

    loop {
        tokio::select! {
            biased;

            records = reconciles.recv() => {
                let Some(records) = records else { break };
                last = Instant::now();
                published.send_replace(estimator.reconcile(&records));
            }
            _ = interval.tick() => {
                let now = Instant::now();
                published.send_replace(estimator.tick(now - last));
                last = now;
            }
        }
    }
}
