//! # Contract Gateway
//!
//! The typed contract-call boundary. Everything the client knows about the
//! NFT, Token, Vault, Referral and Stablecoin contracts goes through
//! [`ContractGateway`]; the rest of the crate never builds RPC requests.
//!
//! ## Module Organization
//!
//! - [`views`]: JSON view types returned by the contracts
//! - [`near`]: `near-api` implementation used against a real node

pub mod near;
pub mod views;

use std::fmt;

use async_trait::async_trait;
use near_api::AccountId;
use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;

use crate::error::{ReadError, WriteError};
pub use views::{NftInfoView, ReferralUserView, SnapshotView, VaultStatsView};

pub type ReadResult<T> = Result<T, ReadError>;

/// A state-changing call on one of the external contracts.
///
/// Amounts are base units already scaled for the target contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteAction {
    /// NFT: mint one NFT, crediting `referrer` if given.
    Mint { referrer: Option<AccountId> },
    /// Token: allow `spender` to pull `amount` reward tokens.
    ApproveToken { spender: AccountId, amount: u128 },
    /// Stablecoin: allow `spender` to pull `amount` stablecoin units.
    ApproveStable { spender: AccountId, amount: u128 },
    /// Token: burn from the signer's wallet.
    Burn { amount: u128 },
    /// Vault: move pending rewards of an NFT into its token balance.
    ClaimTokens { token_id: u64, amount: u128 },
    /// Vault: redeem tokens held by an NFT at the floor price.
    RedeemFromNft { token_id: u64, amount: u128 },
    /// Vault: redeem tokens from the signer's wallet at the floor price.
    RedeemFromWallet { amount: u128 },
    /// Vault: redeem referral bonus tokens.
    RedeemFromBonus { amount: u128 },
}

impl WriteAction {
    /// Short stable name used in logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            WriteAction::Mint { .. } => "mint",
            WriteAction::ApproveToken { .. } => "approve_token",
            WriteAction::ApproveStable { .. } => "approve_stable",
            WriteAction::Burn { .. } => "burn",
            WriteAction::ClaimTokens { .. } => "claim_tokens",
            WriteAction::RedeemFromNft { .. } => "redeem_from_nft",
            WriteAction::RedeemFromWallet { .. } => "redeem_from_wallet",
            WriteAction::RedeemFromBonus { .. } => "redeem_from_bonus",
        }
    }
}

/// Identifier of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A confirmed, successful transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
}

/// Typed access to the external contracts.
///
/// Fungible-token reads take the contract explicitly because both the reward
/// token and the stablecoin implement them; every other call targets the
/// contract configured for its role.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    // Fungible tokens (reward token and stablecoin)
    async fn ft_metadata(&self, contract: &AccountId) -> ReadResult<FungibleTokenMetadata>;
    async fn ft_balance_of(&self, contract: &AccountId, account: &AccountId) -> ReadResult<u128>;
    async fn ft_total_supply(&self, contract: &AccountId) -> ReadResult<u128>;
    async fn allowance(
        &self,
        contract: &AccountId,
        owner: &AccountId,
        spender: &AccountId,
    ) -> ReadResult<u128>;
    async fn max_supply(&self) -> ReadResult<u128>;

    // NFT
    async fn nft_price(&self) -> ReadResult<u128>;
    async fn total_minted(&self) -> ReadResult<u64>;
    async fn nft_balance_of(&self, owner: &AccountId) -> ReadResult<u64>;
    async fn tokens_of_owner(&self, owner: &AccountId) -> ReadResult<Vec<u64>>;

    // Vault
    async fn vault_stats(&self) -> ReadResult<VaultStatsView>;
    async fn floor_price(&self) -> ReadResult<u128>;
    /// One batched call; `None` marks an NFT the vault could not report.
    async fn nft_infos(&self, token_ids: &[u64]) -> ReadResult<Vec<Option<NftInfoView>>>;
    async fn calculate_pending(&self, token_id: u64) -> ReadResult<u128>;
    async fn min_redemption_amount(&self) -> ReadResult<u128>;
    async fn total_accrued_tokens(&self) -> ReadResult<u128>;
    async fn bonus_balance(&self, account: &AccountId) -> ReadResult<u128>;
    async fn recent_snapshots(&self, count: u32) -> ReadResult<Vec<SnapshotView>>;

    // Referral
    async fn referral_user(&self, account: &AccountId) -> ReadResult<Option<ReferralUserView>>;
    async fn is_user_registered(&self, account: &AccountId) -> ReadResult<bool>;
    async fn team_by_levels(&self, account: &AccountId) -> ReadResult<Vec<u64>>;
    async fn commission_count(&self, account: &AccountId) -> ReadResult<u64>;

    // Writes
    /// Signs and submits `action`, returning once the node accepted it.
    async fn submit(&self, action: &WriteAction) -> Result<TxHash, WriteError>;
    /// Waits until `tx` is final and reports its on-chain outcome.
    async fn confirm(&self, tx: &TxHash) -> Result<TxReceipt, WriteError>;
}
