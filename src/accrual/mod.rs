//! # Accrual Estimator
//!
//! Client-side estimate of an owner's pending rewards between on-chain
//! refreshes.
//!
//! ## Model
//!
//! - `reconcile(records)` resets the estimate to the authoritative value:
//!   pending tokens of every distributed, active NFT plus a base credit for
//!   each active NFT that has not been distributed to yet.
//! - `tick(elapsed)` adds `accruing × tokens_per_day × elapsed / 1 day`, where
//!   `accruing` counts the active NFTs that have been distributed to.
//! - Ticking only ever increases the estimate; only a reconcile can lower it.
//! - With no active NFTs the estimate stays at zero.
//!
//! ## Module Organization
//!
//! - This module: the pure [`AccrualEstimator`]
//! - [`ticker`]: the task that ticks it once per interval

pub mod ticker;

use std::time::Duration;

use serde::Serialize;

use crate::config::AccrualSettings;
use crate::reader::NftRewardRecord;

pub use ticker::AccrualTicker;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Estimated pending rewards, in whole tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PendingRewardEstimate {
    /// Value at the last reconciliation.
    pub authoritative: f64,
    /// Authoritative value plus client-side accrual since then.
    pub estimate: f64,
    /// Number of NFTs currently accruing.
    pub accruing: u64,
}

#[derive(Clone, Debug)]
pub struct AccrualEstimator {
    settings: AccrualSettings,
    state: PendingRewardEstimate,
    has_active: bool,
}

impl AccrualEstimator {
    pub fn new(settings: AccrualSettings) -> Self {
        Self {
            settings,
            state: PendingRewardEstimate::default(),
            has_active: false,
        }
    }

    pub fn current(&self) -> PendingRewardEstimate {
        self.state
    }

    /// Replaces the estimate with the authoritative value from `records`.
    pub fn reconcile(&mut self, records: &[NftRewardRecord]) -> PendingRewardEstimate {
        let mut authoritative = 0.0;
        let mut accruing = 0;
        let mut has_active = false;

        for record in records.iter().filter(|r| r.is_active) {
            has_active = true;
            if record.is_distributed() {
                authoritative += record.pending.to_f64();
                accruing += 1;
            } else {
                authoritative += self.settings.base_credit;
            }
        }

        self.has_active = has_active;
        self.state = if has_active {
            PendingRewardEstimate {
                authoritative,
                estimate: authoritative,
                accruing,
            }
        } else {
            PendingRewardEstimate::default()
        };
        self.state
    }

    /// Advances the estimate by `elapsed` of accrual.
    pub fn tick(&mut self, elapsed: Duration) -> PendingRewardEstimate {
        if !self.has_active {
            self.state.estimate = 0.0;
            return self.state;
        }

        let increment = self.state.accruing as f64 * self.settings.tokens_per_day
            * elapsed.as_secs_f64()
            / SECONDS_PER_DAY;
        if increment.is_finite() && increment > 0.0 {
            self.state.estimate += increment;
        }
        self.state
    }
}
