//! JSON view types returned by the external contracts.
//!
//! Integers wider than 53 bits travel as strings (`U128`/`U64`), matching the
//! NEAR JSON convention.

use near_sdk::json_types::{U128, U64};
use serde::{Deserialize, Serialize};

/// `get_nft_infos` entry for a single NFT.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NftInfoView {
    pub token_balance: U128,
    pub pending_tokens: U128,
    pub total_earned: U128,
    pub total_claimed: U128,
    pub total_redeemed: U128,
    pub liquidity_value: U128,
    pub is_active: bool,
    #[serde(default)]
    pub last_distribution_time: U64,
}

/// `get_vault_stats` aggregate.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VaultStatsView {
    pub backing: U128,
    pub distributed: U128,
    pub claimed: U128,
    pub redeemed: U128,
    pub redeemed_stable: U128,
    pub floor_price: U128,
    pub active_nfts: U64,
    pub vault_token_balance: U128,
    pub daily_reward: U128,
}

/// `get_recent_snapshots` entry.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotView {
    /// UNIX seconds.
    pub timestamp: U64,
    pub total_backing: U128,
    pub total_distributed: U128,
    pub floor_price: U128,
    pub active_nfts: U64,
}

/// `get_user` record of the referral contract.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferralUserView {
    pub referrer: Option<String>,
    pub is_registered: bool,
    pub direct_referrals: U64,
    pub total_team_size: U64,
    pub total_earned: U128,
}
