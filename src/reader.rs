//! # Contract Read Aggregator
//!
//! Reads NFT, Token, Vault, Referral and Stablecoin state and normalizes it
//! into decimal-scaled values.
//!
//! ## Failure Policy
//!
//! Reads never fail. A failed call is logged as a `read_unavailable` event and
//! replaced by a zero default, so one unreachable contract cannot blank out
//! unrelated parts of the view.
//!
//! ## Precision
//!
//! Reward-token amounts use [`crate::units::TOKEN_DECIMALS`]. Stablecoin amounts (backing,
//! liquidity value, floor price, NFT price) use the decimals resolved from the
//! stablecoin's metadata.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use near_api::AccountId;

use crate::config::ContractAddresses;
use crate::decimals::DecimalsResolver;
use crate::events::ReadUnavailable;
use crate::floor_price::{resolve_floor_price, FloorPrice, FloorPriceInputs};
use crate::gateway::{ContractGateway, NftInfoView, ReadResult, SnapshotView, VaultStatsView};
use crate::referral::{ReferralSummary, REFERRAL_LEVELS};
use crate::units::{Amount, DEFAULT_DECIMALS};

// ============================================================================
// Normalized Records
// ============================================================================

/// Reward state of a single NFT.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NftRewardRecord {
    pub token_id: u64,
    pub token_balance: Amount,
    pub pending: Amount,
    pub total_earned: Amount,
    pub total_claimed: Amount,
    pub total_redeemed: Amount,
    /// Stablecoin value of the NFT's token balance at the floor price.
    pub liquidity_value: Amount,
    pub is_active: bool,
    /// UNIX seconds of the last distribution; 0 if it never received one.
    pub last_distribution_time: u64,
}

impl NftRewardRecord {
    /// Placeholder for an NFT whose state could not be read.
    ///
    /// The liquidity value is at [`DEFAULT_DECIMALS`]; the reader uses
    /// [`NftRewardRecord::unavailable_with`] so it matches readable records.
    pub fn unavailable(token_id: u64) -> Self {
        Self::unavailable_with(token_id, DEFAULT_DECIMALS)
    }

    /// Placeholder with its liquidity value at `stable_decimals`.
    pub fn unavailable_with(token_id: u64, stable_decimals: u8) -> Self {
        Self {
            token_id,
            token_balance: Amount::tokens(0),
            pending: Amount::tokens(0),
            total_earned: Amount::tokens(0),
            total_claimed: Amount::tokens(0),
            total_redeemed: Amount::tokens(0),
            liquidity_value: Amount::zero(stable_decimals),
            is_active: false,
            last_distribution_time: 0,
        }
    }

    fn from_view(token_id: u64, view: &NftInfoView, stable_decimals: u8) -> Self {
        Self {
            token_id,
            token_balance: Amount::tokens(view.token_balance.0),
            pending: Amount::tokens(view.pending_tokens.0),
            total_earned: Amount::tokens(view.total_earned.0),
            total_claimed: Amount::tokens(view.total_claimed.0),
            total_redeemed: Amount::tokens(view.total_redeemed.0),
            liquidity_value: Amount::new(view.liquidity_value.0, stable_decimals),
            is_active: view.is_active,
            last_distribution_time: view.last_distribution_time.0,
        }
    }

    /// Has received at least one distribution.
    pub fn is_distributed(&self) -> bool {
        self.last_distribution_time > 0
    }
}

/// Vault-wide aggregates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VaultStats {
    pub total_backing: Amount,
    pub total_distributed: Amount,
    pub total_claimed: Amount,
    pub total_redeemed: Amount,
    pub total_redeemed_stable: Amount,
    /// Authoritative price in stablecoin base units per whole token.
    pub floor_price: Amount,
    pub active_nfts: u64,
    pub vault_token_balance: Amount,
    pub daily_reward: Amount,
}

impl Default for VaultStats {
    fn default() -> Self {
        Self::from_view(&VaultStatsView::default(), 0)
    }
}

impl VaultStats {
    fn from_view(view: &VaultStatsView, stable_decimals: u8) -> Self {
        Self {
            total_backing: Amount::new(view.backing.0, stable_decimals),
            total_distributed: Amount::tokens(view.distributed.0),
            total_claimed: Amount::tokens(view.claimed.0),
            total_redeemed: Amount::tokens(view.redeemed.0),
            total_redeemed_stable: Amount::new(view.redeemed_stable.0, stable_decimals),
            floor_price: Amount::new(view.floor_price.0, stable_decimals),
            active_nfts: view.active_nfts.0,
            vault_token_balance: Amount::tokens(view.vault_token_balance.0),
            daily_reward: Amount::tokens(view.daily_reward.0),
        }
    }
}

/// All NFTs of one owner with their totals.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardsSummary {
    pub records: Vec<NftRewardRecord>,
    pub total_token_balance: Amount,
    /// Authoritative pending total as last reported by the vault.
    pub total_pending: Amount,
    pub active_count: usize,
}

impl RewardsSummary {
    pub fn from_records(records: Vec<NftRewardRecord>) -> Self {
        let total_token_balance = records
            .iter()
            .fold(Amount::tokens(0), |sum, r| sum.saturating_add(r.token_balance));
        let total_pending = records
            .iter()
            .fold(Amount::tokens(0), |sum, r| sum.saturating_add(r.pending));
        let active_count = records.iter().filter(|r| r.is_active).count();
        Self {
            records,
            total_token_balance,
            total_pending,
            active_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NftOverview {
    /// Mint price in stablecoin.
    pub price: Amount,
    pub total_minted: u64,
    pub owner_balance: u64,
    pub owner_token_ids: Vec<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TokenOverview {
    pub balance: Amount,
    pub total_supply: Amount,
    pub max_supply: Amount,
}

/// Historical vault point used for charting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VaultSnapshot {
    pub timestamp: DateTime<Utc>,
    pub total_backing: Amount,
    pub total_distributed: Amount,
    pub floor_price: Amount,
    pub active_nfts: u64,
}

impl VaultSnapshot {
    fn from_view(view: &SnapshotView, stable_decimals: u8) -> Self {
        let timestamp = i64::try_from(view.timestamp.0)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or_default();
        Self {
            timestamp,
            total_backing: Amount::new(view.total_backing.0, stable_decimals),
            total_distributed: Amount::tokens(view.total_distributed.0),
            floor_price: Amount::new(view.floor_price.0, stable_decimals),
            active_nfts: view.active_nfts.0,
        }
    }
}

// ============================================================================
// Reader
// ============================================================================

pub struct ContractReader<G> {
    gateway: Arc<G>,
    contracts: ContractAddresses,
    decimals: Arc<DecimalsResolver<G>>,
}

impl<G> Clone for ContractReader<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            contracts: self.contracts.clone(),
            decimals: self.decimals.clone(),
        }
    }
}

/// Unwraps a read, substituting `T::default()` on failure.
fn absorb<T: Default>(method: &str, result: ReadResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            ReadUnavailable {
                method,
                reason: &e.to_string(),
            }
            .emit();
            T::default()
        }
    }
}

impl<G: ContractGateway> ContractReader<G> {
    pub fn new(
        gateway: Arc<G>,
        contracts: ContractAddresses,
        decimals: Arc<DecimalsResolver<G>>,
    ) -> Self {
        Self {
            gateway,
            contracts,
            decimals,
        }
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    pub(crate) fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Resolved decimals of the stablecoin.
    pub async fn stable_decimals(&self) -> u8 {
        self.decimals.decimals_of(&self.contracts.stablecoin).await
    }

    // ------------------------------------------------------------------------
    // NFT rewards
    // ------------------------------------------------------------------------

    /// Reward records for `token_ids` in one batched vault call, in input order.
    pub async fn read_nft_batch(&self, token_ids: &[u64]) -> Vec<NftRewardRecord> {
        if token_ids.is_empty() {
            return Vec::new();
        }
        let stable_decimals = self.stable_decimals().await;

        let infos = match self.gateway.nft_infos(token_ids).await {
            Ok(infos) => infos,
            Err(e) => {
                ReadUnavailable {
                    method: "get_nft_infos",
                    reason: &e.to_string(),
                }
                .emit();
                Vec::new()
            }
        };

        token_ids
            .iter()
            .enumerate()
            .map(|(i, &token_id)| match infos.get(i) {
                Some(Some(view)) => NftRewardRecord::from_view(token_id, view, stable_decimals),
                _ => NftRewardRecord::unavailable_with(token_id, stable_decimals),
            })
            .collect()
    }

    /// Every NFT of `owner` with totals.
    pub async fn read_owner_rewards(&self, owner: &AccountId) -> RewardsSummary {
        let token_ids = absorb("tokens_of_owner", self.gateway.tokens_of_owner(owner).await);
        RewardsSummary::from_records(self.read_nft_batch(&token_ids).await)
    }

    /// Pending reward tokens of one NFT.
    pub async fn read_pending(&self, token_id: u64) -> Amount {
        Amount::tokens(absorb(
            "calculate_pending",
            self.gateway.calculate_pending(token_id).await,
        ))
    }

    pub async fn read_nft_overview(&self, owner: &AccountId) -> NftOverview {
        let stable_decimals = self.stable_decimals().await;
        NftOverview {
            price: Amount::new(absorb("nft_price", self.gateway.nft_price().await), stable_decimals),
            total_minted: absorb("total_minted", self.gateway.total_minted().await),
            owner_balance: absorb("nft_balance_of", self.gateway.nft_balance_of(owner).await),
            owner_token_ids: absorb("tokens_of_owner", self.gateway.tokens_of_owner(owner).await),
        }
    }

    // ------------------------------------------------------------------------
    // Vault
    // ------------------------------------------------------------------------

    pub async fn read_vault_stats(&self) -> VaultStats {
        match self.gateway.vault_stats().await {
            Ok(view) => VaultStats::from_view(&view, self.stable_decimals().await),
            Err(e) => {
                ReadUnavailable {
                    method: "get_vault_stats",
                    reason: &e.to_string(),
                }
                .emit();
                VaultStats::default()
            }
        }
    }

    pub async fn read_min_redemption(&self) -> Amount {
        Amount::tokens(absorb(
            "min_redemption_amount",
            self.gateway.min_redemption_amount().await,
        ))
    }

    /// Live total of tokens accrued across all NFTs.
    pub async fn read_total_accrued(&self) -> Amount {
        Amount::tokens(absorb(
            "get_total_accrued_tokens",
            self.gateway.total_accrued_tokens().await,
        ))
    }

    /// Referral bonus tokens redeemable by `owner`.
    pub async fn read_bonus_balance(&self, owner: &AccountId) -> Amount {
        Amount::tokens(absorb(
            "user_bonus_balance",
            self.gateway.bonus_balance(owner).await,
        ))
    }

    /// Up to `count` most recent vault snapshots, oldest first.
    pub async fn read_recent_snapshots(&self, count: u32) -> Vec<VaultSnapshot> {
        let views = absorb(
            "get_recent_snapshots",
            self.gateway.recent_snapshots(count).await,
        );
        if views.is_empty() {
            return Vec::new();
        }
        let stable_decimals = self.stable_decimals().await;
        views
            .iter()
            .map(|view| VaultSnapshot::from_view(view, stable_decimals))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Floor price
    // ------------------------------------------------------------------------

    /// Everything the floor-price resolver needs, read in one pass.
    pub async fn read_floor_price_inputs(&self) -> FloorPriceInputs {
        let stats = self.read_vault_stats().await;
        self.floor_price_inputs_for(&stats).await
    }

    /// Floor-price inputs on top of already-read vault stats.
    pub async fn floor_price_inputs_for(&self, stats: &VaultStats) -> FloorPriceInputs {
        let stable_decimals = self.stable_decimals().await;
        let authoritative = absorb("get_floor_price", self.gateway.floor_price().await);

        let mut inputs = FloorPriceInputs {
            authoritative: Amount::new(authoritative, stable_decimals),
            total_backing: stats.total_backing,
            accrued_tokens: Amount::tokens(0),
            active_nfts: stats.active_nfts,
            max_supply: Amount::tokens(0),
        };

        // Fallback denominators are only needed when the vault reports zero.
        if inputs.authoritative.is_zero() && !inputs.total_backing.is_zero() {
            inputs.accrued_tokens = self.read_total_accrued().await;
            if inputs.accrued_tokens.is_zero() && inputs.active_nfts == 0 {
                inputs.max_supply =
                    Amount::tokens(absorb("max_supply", self.gateway.max_supply().await));
            }
        }
        inputs
    }

    pub async fn read_floor_price(&self) -> FloorPrice {
        resolve_floor_price(&self.read_floor_price_inputs().await)
    }

    // ------------------------------------------------------------------------
    // Reward token
    // ------------------------------------------------------------------------

    /// Reward-token allowance granted by `owner` to `spender`.
    pub async fn read_allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        Amount::tokens(absorb(
            "allowance",
            self.gateway
                .allowance(&self.contracts.token, owner, spender)
                .await,
        ))
    }

    /// Reward-token wallet balance of `owner`.
    pub async fn read_balance(&self, owner: &AccountId) -> Amount {
        Amount::tokens(absorb(
            "ft_balance_of",
            self.gateway
                .ft_balance_of(&self.contracts.token, owner)
                .await,
        ))
    }

    pub async fn read_token_overview(&self, owner: &AccountId) -> TokenOverview {
        TokenOverview {
            balance: self.read_balance(owner).await,
            total_supply: Amount::tokens(absorb(
                "ft_total_supply",
                self.gateway.ft_total_supply(&self.contracts.token).await,
            )),
            max_supply: Amount::tokens(absorb("max_supply", self.gateway.max_supply().await)),
        }
    }

    // ------------------------------------------------------------------------
    // Stablecoin
    // ------------------------------------------------------------------------

    pub async fn read_stable_balance(&self, owner: &AccountId) -> Amount {
        let decimals = self.stable_decimals().await;
        let raw = absorb(
            "ft_balance_of",
            self.gateway
                .ft_balance_of(&self.contracts.stablecoin, owner)
                .await,
        );
        Amount::new(raw, decimals)
    }

    pub async fn read_stable_allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        let decimals = self.stable_decimals().await;
        let raw = absorb(
            "allowance",
            self.gateway
                .allowance(&self.contracts.stablecoin, owner, spender)
                .await,
        );
        Amount::new(raw, decimals)
    }

    // ------------------------------------------------------------------------
    // Referral
    // ------------------------------------------------------------------------

    /// On-chain referral aggregates of `owner`.
    pub async fn read_referral(&self, owner: &AccountId) -> ReferralSummary {
        let user = absorb("get_user", self.gateway.referral_user(owner).await).unwrap_or_default();
        let is_registered = user.is_registered
            || absorb(
                "is_user_registered",
                self.gateway.is_user_registered(owner).await,
            );

        let mut team_by_levels = [0u64; REFERRAL_LEVELS];
        let levels = absorb(
            "get_team_by_levels",
            self.gateway.team_by_levels(owner).await,
        );
        for (slot, count) in team_by_levels.iter_mut().zip(levels) {
            *slot = count;
        }

        let stable_decimals = self.stable_decimals().await;
        ReferralSummary {
            referrer: user.referrer.and_then(|r| r.parse().ok()),
            is_registered,
            direct_referrals: user.direct_referrals.0,
            total_team_size: user.total_team_size.0,
            total_earned: Amount::new(user.total_earned.0, stable_decimals),
            team_by_levels,
            commission_count: absorb(
                "get_commission_count",
                self.gateway.commission_count(owner).await,
            ),
        }
    }
}
