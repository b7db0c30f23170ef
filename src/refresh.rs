//! # Refresh Scheduler
//!
//! Periodically re-reads vault aggregates and the owner's NFT rewards, and
//! hands every fresh NFT batch to the [`AccrualTicker`] as its new
//! authoritative value.
//!
//! ## Triggers
//!
//! - Start: both reads run immediately
//! - Timers: vault stats every `refresh.vault_secs`, NFT batch every
//!   `refresh.nft_secs`
//! - Explicit: [`RefreshScheduler::refresh_now`], or a change of the write
//!   orchestrator's success counter. Every scheduler following the counter
//!   sees every change.
//!
//! The task is aborted by [`RefreshScheduler::stop`] and on drop.

use std::sync::{Arc, Mutex};

use near_api::AccountId;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::accrual::AccrualTicker;
use crate::config::RefreshIntervals;
use crate::floor_price::{resolve_floor_price, FloorPrice};
use crate::gateway::ContractGateway;
use crate::reader::{ContractReader, RewardsSummary, VaultStats};

/// Vault aggregates together with the floor price resolved from them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VaultView {
    pub stats: VaultStats,
    pub floor_price: FloorPrice,
}

impl Default for VaultView {
    fn default() -> Self {
        Self {
            stats: VaultStats::default(),
            floor_price: FloorPrice::unavailable(),
        }
    }
}

struct Shared<G> {
    reader: ContractReader<G>,
    owner: AccountId,
    ticker: Arc<AccrualTicker>,
    vault: watch::Sender<VaultView>,
    rewards: watch::Sender<RewardsSummary>,
}

impl<G: ContractGateway> Shared<G> {
    async fn refresh_vault(&self) {
        let stats = self.reader.read_vault_stats().await;
        let inputs = self.reader.floor_price_inputs_for(&stats).await;
        let floor_price = resolve_floor_price(&inputs);
        self.vault.send_replace(VaultView { stats, floor_price });
    }

    async fn refresh_nfts(&self) {
        let summary = self.reader.read_owner_rewards(&self.owner).await;
        self.ticker.reconcile(&summary.records);
        tracing::debug!(
            "NFT rewards refreshed: owner={} nfts={} active={}",
            self.owner,
            summary.records.len(),
            summary.active_count
        );
        self.rewards.send_replace(summary);
    }
}

pub struct RefreshScheduler<G> {
    shared: Arc<Shared<G>>,
    intervals: RefreshIntervals,
    manual: Arc<Notify>,
    writes: watch::Receiver<u64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<G: ContractGateway + 'static> RefreshScheduler<G> {
    pub fn new(
        reader: ContractReader<G>,
        owner: AccountId,
        ticker: Arc<AccrualTicker>,
        intervals: RefreshIntervals,
        writes: watch::Receiver<u64>,
    ) -> Self {
        let (vault, _) = watch::channel(VaultView::default());
        let (rewards, _) = watch::channel(RewardsSummary::from_records(Vec::new()));
        Self {
            shared: Arc::new(Shared {
                reader,
                owner,
                ticker,
                vault,
                rewards,
            }),
            intervals,
            manual: Arc::new(Notify::new()),
            writes,
            handle: Mutex::new(None),
        }
    }

    /// Spawns the refresh task. Does nothing if it is already running.
    pub fn start(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let shared = self.shared.clone();
        let manual = self.manual.clone();
        let mut writes = self.writes.clone();
        writes.mark_unchanged();
        let intervals = self.intervals.clone();
        *handle = Some(tokio::spawn(async move {
            let mut vault = time::interval(intervals.vault());
            let mut nfts = time::interval(intervals.nft());
            vault.set_missed_tick_behavior(MissedTickBehavior::Delay);
            nfts.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = manual.notified() => {
                        shared.refresh_vault().await;
                        shared.refresh_nfts().await;
                    }
                    // Disabled once the orchestrator is gone.
                    Ok(()) = writes.changed() => {
                        shared.refresh_vault().await;
                        shared.refresh_nfts().await;
                    }
                    _ = vault.tick() => shared.refresh_vault().await,
                    _ = nfts.tick() => shared.refresh_nfts().await,
                }
            }
        }));

        tracing::debug!(
            "Refresh scheduler started: vault_secs={} nft_secs={}",
            self.intervals.vault_secs,
            self.intervals.nft_secs
        );
    }

    pub fn stop(&self) {
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("Refresh scheduler stopped");
        }
    }

    /// Requests an immediate refresh of everything.
    pub fn refresh_now(&self) {
        self.manual.notify_one();
    }

    pub fn vault(&self) -> watch::Receiver<VaultView> {
        self.shared.vault.subscribe()
    }

    pub fn rewards(&self) -> watch::Receiver<RewardsSummary> {
        self.shared.rewards.subscribe()
    }
}

impl<G> Drop for RefreshScheduler<G> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().ok().and_then(Option::take) {
            handle.abort();
        }
    }
}
