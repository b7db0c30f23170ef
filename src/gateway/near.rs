//! # NEAR Gateway
//!
//! [`ContractGateway`] over `near-api`: view calls for reads, signed
//! function-call transactions for writes.
//!
//! `near-api` returns from `send_to` only once a transaction is final. So
//! [`NearGateway::submit`] signs the transaction, takes its hash and hands the
//! broadcast to a background task; [`NearGateway::confirm`] waits for that
//! task's outcome. Callers bound the wait, and dropping it leaves the
//! broadcast running.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use near_api::advanced::TransactionableOrSigned;
use near_api::near_primitives::views::FinalExecutionStatus;
use near_api::{AccountId, Contract, Data, NearToken, NetworkConfig, Signer};
use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;
use near_sdk::json_types::{U128, U64};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use super::{
    ContractGateway, NftInfoView, ReadResult, ReferralUserView, SnapshotView, TxHash, TxReceipt,
    VaultStatsView, WriteAction,
};
use crate::config::ContractAddresses;
use crate::error::{ReadError, WriteError};

/// Broadcast of a signed transaction, resolving to its final status.
type Finality = JoinHandle<Result<FinalExecutionStatus, String>>;

/// Contract gateway backed by a NEAR RPC endpoint.
pub struct NearGateway {
    network: NetworkConfig,
    contracts: ContractAddresses,
    signer: Option<(AccountId, Arc<Signer>)>,
    in_flight: Mutex<HashMap<TxHash, Finality>>,
}

impl NearGateway {
    /// Read-only gateway. Every write returns [`WriteError::Rejected`].
    pub fn new(network: NetworkConfig, contracts: ContractAddresses) -> Self {
        Self {
            network,
            contracts,
            signer: None,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Attaches the account that signs write transactions.
    pub fn with_signer(mut self, account_id: AccountId, signer: Arc<Signer>) -> Self {
        self.signer = Some((account_id, signer));
        self
    }

    async fn view<T>(&self, contract: &AccountId, method: &'static str, args: Value) -> ReadResult<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        tracing::trace!("view_call contract={} method={}", contract, method);

        let response: Data<T> = Contract(contract.clone())
            .call_function(method, args)
            .map_err(|e| ReadError::rpc(method, e))?
            .read_only()
            .fetch_from(&self.network)
            .await
            .map_err(|e| ReadError::rpc(method, e))?;

        Ok(response.data)
    }

    /// Target contract, method name and JSON arguments for `action`.
    pub(crate) fn call_for(&self, action: &WriteAction) -> (&AccountId, &'static str, Value) {
        let c = &self.contracts;
        match action {
            WriteAction::Mint { referrer } => (
                &c.nft,
                "mint",
                json!({ "referrer": referrer.as_ref().map(|r| r.to_string()) }),
            ),
            WriteAction::ApproveToken { spender, amount } => (
                &c.token,
                "approve",
                json!({ "spender_id": spender.to_string(), "amount": amount.to_string() }),
            ),
            WriteAction::ApproveStable { spender, amount } => (
                &c.stablecoin,
                "approve",
                json!({ "spender_id": spender.to_string(), "amount": amount.to_string() }),
            ),
            WriteAction::Burn { amount } => {
                (&c.token, "burn", json!({ "amount": amount.to_string() }))
            }
            WriteAction::ClaimTokens { token_id, amount } => (
                &c.vault,
                "claim_tokens",
                json!({ "token_id": U64(*token_id), "amount": amount.to_string() }),
            ),
            WriteAction::RedeemFromNft { token_id, amount } => (
                &c.vault,
                "redeem_from_nft",
                json!({ "token_id": U64(*token_id), "amount": amount.to_string() }),
            ),
            WriteAction::RedeemFromWallet { amount } => (
                &c.vault,
                "redeem_from_wallet",
                json!({ "amount": amount.to_string() }),
            ),
            WriteAction::RedeemFromBonus { amount } => (
                &c.vault,
                "redeem_from_bonus",
                json!({ "token_amount": amount.to_string() }),
            ),
        }
    }
}

#[async_trait]
impl ContractGateway for NearGateway {
    async fn ft_metadata(&self, contract: &AccountId) -> ReadResult<FungibleTokenMetadata> {
        self.view(contract, "ft_metadata", json!({})).await
    }

    async fn ft_balance_of(&self, contract: &AccountId, account: &AccountId) -> ReadResult<u128> {
        let balance: U128 = self
            .view(contract, "ft_balance_of", json!({ "account_id": account.to_string() }))
            .await?;
        Ok(balance.0)
    }

    async fn ft_total_supply(&self, contract: &AccountId) -> ReadResult<u128> {
        let supply: U128 = self.view(contract, "ft_total_supply", json!({})).await?;
        Ok(supply.0)
    }

    async fn allowance(
        &self,
        contract: &AccountId,
        owner: &AccountId,
        spender: &AccountId,
    ) -> ReadResult<u128> {
        let args = json!({ "owner_id": owner.to_string(), "spender_id": spender.to_string() });
        let allowance: U128 = self.view(contract, "allowance", args).await?;
        Ok(allowance.0)
    }

    async fn max_supply(&self) -> ReadResult<u128> {
        let max: U128 = self.view(&self.contracts.token, "max_supply", json!({})).await?;
        Ok(max.0)
    }

    async fn nft_price(&self) -> ReadResult<u128> {
        let price: U128 = self.view(&self.contracts.nft, "nft_price", json!({})).await?;
        Ok(price.0)
    }

    async fn total_minted(&self) -> ReadResult<u64> {
        let minted: U64 = self.view(&self.contracts.nft, "total_minted", json!({})).await?;
        Ok(minted.0)
    }

    async fn nft_balance_of(&self, owner: &AccountId) -> ReadResult<u64> {
        let args = json!({ "account_id": owner.to_string() });
        let balance: U64 = self.view(&self.contracts.nft, "nft_balance_of", args).await?;
        Ok(balance.0)
    }

    async fn tokens_of_owner(&self, owner: &AccountId) -> ReadResult<Vec<u64>> {
        let args = json!({ "account_id": owner.to_string() });
        let ids: Vec<U64> = self.view(&self.contracts.nft, "tokens_of_owner", args).await?;
        Ok(ids.into_iter().map(|id| id.0).collect())
    }

    async fn vault_stats(&self) -> ReadResult<VaultStatsView> {
        self.view(&self.contracts.vault, "get_vault_stats", json!({})).await
    }

    async fn floor_price(&self) -> ReadResult<u128> {
        let price: U128 = self.view(&self.contracts.vault, "get_floor_price", json!({})).await?;
        Ok(price.0)
    }

    async fn nft_infos(&self, token_ids: &[u64]) -> ReadResult<Vec<Option<NftInfoView>>> {
        if token_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<U64> = token_ids.iter().copied().map(U64).collect();
        let infos: Vec<Option<NftInfoView>> = self
            .view(&self.contracts.vault, "get_nft_infos", json!({ "token_ids": ids }))
            .await?;
        if infos.len() != token_ids.len() {
            return Err(ReadError::decode(
                "get_nft_infos",
                format!("expected {} entries, got {}", token_ids.len(), infos.len()),
            ));
        }
        Ok(infos)
    }

    async fn calculate_pending(&self, token_id: u64) -> ReadResult<u128> {
        let args = json!({ "token_id": U64(token_id) });
        let pending: U128 = self.view(&self.contracts.vault, "calculate_pending", args).await?;
        Ok(pending.0)
    }

    async fn min_redemption_amount(&self) -> ReadResult<u128> {
        let min: U128 = self
            .view(&self.contracts.vault, "min_redemption_amount", json!({}))
            .await?;
        Ok(min.0)
    }

    async fn total_accrued_tokens(&self) -> ReadResult<u128> {
        let accrued: U128 = self
            .view(&self.contracts.vault, "get_total_accrued_tokens", json!({}))
            .await?;
        Ok(accrued.0)
    }

    async fn bonus_balance(&self, account: &AccountId) -> ReadResult<u128> {
        let args = json!({ "account_id": account.to_string() });
        let bonus: U128 = self.view(&self.contracts.vault, "user_bonus_balance", args).await?;
        Ok(bonus.0)
    }

    async fn recent_snapshots(&self, count: u32) -> ReadResult<Vec<SnapshotView>> {
        self.view(
            &self.contracts.vault,
            "get_recent_snapshots",
            json!({ "count": count }),
        )
        .await
    }

    async fn referral_user(&self, account: &AccountId) -> ReadResult<Option<ReferralUserView>> {
        let args = json!({ "account_id": account.to_string() });
        self.view(&self.contracts.referral, "get_user", args).await
    }

    async fn is_user_registered(&self, account: &AccountId) -> ReadResult<bool> {
        let args = json!({ "account_id": account.to_string() });
        self.view(&self.contracts.referral, "is_user_registered", args).await
    }

    async fn team_by_levels(&self, account: &AccountId) -> ReadResult<Vec<u64>> {
        let args = json!({ "account_id": account.to_string() });
        let levels: Vec<U64> = self
            .view(&self.contracts.referral, "get_team_by_levels", args)
            .await?;
        Ok(levels.into_iter().map(|l| l.0).collect())
    }

    async fn commission_count(&self, account: &AccountId) -> ReadResult<u64> {
        let args = json!({ "account_id": account.to_string() });
        let count: U64 = self
            .view(&self.contracts.referral, "get_commission_count", args)
            .await?;
        Ok(count.0)
    }

    async fn submit(&self, action: &WriteAction) -> Result<TxHash, WriteError> {
        let Some((signer_id, signer)) = &self.signer else {
            return Err(WriteError::Rejected("no signer configured".to_string()));
        };
        let (contract, method, args) = self.call_for(action);

        tracing::debug!(
            "submit_call contract={} method={} signer={}",
            contract,
            method,
            signer_id
        );

        let transaction = Contract(contract.clone())
            .call_function(method, args)
            .map_err(|e| WriteError::Rejected(e.to_string()))?
            .transaction()
            .deposit(NearToken::from_yoctonear(1))
            .with_signer(signer_id.clone(), signer.clone())
            .presign_with(&self.network)
            .await
            .map_err(|e| WriteError::Rejected(e.to_string()))?;

        let tx_hash = match &transaction.tr {
            TransactionableOrSigned::Signed((signed, _)) => TxHash(signed.get_hash().to_string()),
            TransactionableOrSigned::Transactionable(_) => {
                return Err(WriteError::Rejected("transaction was not signed".to_string()));
            }
        };

        let network = self.network.clone();
        let finality = tokio::spawn(async move {
            transaction
                .send_to(&network)
                .await
                .map(|outcome| outcome.status)
                .map_err(|e| e.to_string())
        });
        self.in_flight
            .lock()
            .map_err(|_| WriteError::Rejected("in-flight store poisoned".to_string()))?
            .insert(tx_hash.clone(), finality);

        Ok(tx_hash)
    }

    async fn confirm(&self, tx: &TxHash) -> Result<TxReceipt, WriteError> {
        let finality = self
            .in_flight
            .lock()
            .map_err(|_| WriteError::Rejected("in-flight store poisoned".to_string()))?
            .remove(tx)
            .ok_or_else(|| WriteError::Rejected(format!("unknown transaction {tx}")))?;

        let status = finality
            .await
            .map_err(|e| WriteError::Rejected(format!("broadcast task failed: {e}")))?
            .map_err(WriteError::Rejected)?;

        match status {
            FinalExecutionStatus::SuccessValue(_) => Ok(TxReceipt {
                tx_hash: tx.clone(),
            }),
            FinalExecutionStatus::Failure(err) => Err(WriteError::Reverted {
                reason: Some(format!("{:?}", err)),
            }),
            other => Err(WriteError::Reverted {
                reason: Some(format!("unexpected status: {:?}", other)),
            }),
        }
    }
}
