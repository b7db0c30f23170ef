//! # Test Utilities
//!
//! An in-memory [`ContractGateway`] and builders for unit tests.
//!
//! ## Modules
//!
//! - [`mock`]: scripted gateway with failure injection and a call log
//! - [`builders`]: fluent setup of gateway state

/// Scripted in-memory gateway.
#[cfg(test)]
pub mod mock {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use near_api::AccountId;
    use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;

    use crate::config::ContractAddresses;
    use crate::error::{ReadError, WriteError};
    use crate::gateway::{
        ContractGateway, NftInfoView, ReadResult, ReferralUserView, SnapshotView, TxHash,
        TxReceipt, VaultStatsView, WriteAction,
    };

    /// How `confirm` behaves for a given action.
    #[derive(Clone, Debug)]
    pub enum ConfirmBehavior {
        Succeed,
        Fail(WriteError),
        Hang,
    }

    #[derive(Default)]
    pub struct MockState {
        pub decimals: HashMap<AccountId, u8>,
        pub balances: HashMap<(AccountId, AccountId), u128>,
        pub allowances: HashMap<(AccountId, AccountId, AccountId), u128>,
        pub total_supply: u128,
        pub max_supply: u128,
        pub nft_price: u128,
        pub total_minted: u64,
        pub owned: HashMap<AccountId, Vec<u64>>,
        pub vault_stats: VaultStatsView,
        pub floor_price: u128,
        pub nft_infos: HashMap<u64, NftInfoView>,
        pub unreadable_nfts: HashSet<u64>,
        pub min_redemption: u128,
        pub total_accrued: u128,
        pub bonus: HashMap<AccountId, u128>,
        pub snapshots: Vec<SnapshotView>,
        pub referral_users: HashMap<AccountId, ReferralUserView>,
        pub team_levels: HashMap<AccountId, Vec<u64>>,
        pub commissions: HashMap<AccountId, u64>,
        pub failing: HashSet<String>,
        pub calls: Vec<String>,
        pub write_log: Vec<String>,
        pub submitted: HashMap<TxHash, WriteAction>,
        pub submit_failures: HashMap<&'static str, WriteError>,
        /// Actions whose submission never returns.
        pub hanging_submits: HashSet<&'static str>,
        pub confirm_behavior: HashMap<&'static str, ConfirmBehavior>,
        pub next_tx: u64,
    }

    pub struct MockGateway {
        contracts: ContractAddresses,
        pub state: Mutex<MockState>,
    }

    impl MockGateway {
        pub fn new(contracts: ContractAddresses, state: MockState) -> Self {
            Self {
                contracts,
                state: Mutex::new(state),
            }
        }

        pub fn contracts(&self) -> &ContractAddresses {
            &self.contracts
        }

        pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
            f(&mut self.state.lock().unwrap())
        }

        pub fn fail(&self, method: &str) {
            self.with_state(|s| s.failing.insert(method.to_string()));
        }

        pub fn recover(&self, method: &str) {
            self.with_state(|s| s.failing.remove(method));
        }

        pub fn call_count(&self, method: &str) -> usize {
            self.with_state(|s| s.calls.iter().filter(|c| *c == method).count())
        }

        /// Ordered `submit:<action>` / `confirm:<action>` entries.
        pub fn write_log(&self) -> Vec<String> {
            self.with_state(|s| s.write_log.clone())
        }

        pub fn submitted_names(&self) -> Vec<String> {
            self.write_log()
                .into_iter()
                .filter_map(|entry| entry.strip_prefix("submit:").map(str::to_string))
                .collect()
        }

        pub fn fail_submit(&self, action: &'static str, error: WriteError) {
            self.with_state(|s| s.submit_failures.insert(action, error));
        }

        pub fn hang_submit(&self, action: &'static str) {
            self.with_state(|s| s.hanging_submits.insert(action));
        }

        pub fn confirm_with(&self, action: &'static str, behavior: ConfirmBehavior) {
            self.with_state(|s| s.confirm_behavior.insert(action, behavior));
        }

        pub fn set_nft(&self, token_id: u64, info: NftInfoView) {
            self.with_state(|s| s.nft_infos.insert(token_id, info));
        }

        fn read(&self, method: &str) -> ReadResult<std::sync::MutexGuard<'_, MockState>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(method.to_string());
            if state.failing.contains(method) {
                return Err(ReadError::rpc(method, "injected failure"));
            }
            Ok(state)
        }
    }

    #[async_trait]
    impl ContractGateway for MockGateway {
        async fn ft_metadata(&self, contract: &AccountId) -> ReadResult<FungibleTokenMetadata> {
            let state = self.read("ft_metadata")?;
            let decimals = *state
                .decimals
                .get(contract)
                .ok_or_else(|| ReadError::rpc("ft_metadata", "no such contract"))?;
            Ok(FungibleTokenMetadata {
                spec: "ft-1.0.0".to_string(),
                name: contract.to_string(),
                symbol: if contract == &self.contracts.stablecoin {
                    "USDC".to_string()
                } else {
                    "LIMITLESS".to_string()
                },
                icon: None,
                reference: None,
                reference_hash: None,
                decimals,
            })
        }

        async fn ft_balance_of(&self, contract: &AccountId, account: &AccountId) -> ReadResult<u128> {
            let state = self.read("ft_balance_of")?;
            let key = (contract.clone(), account.clone());
            Ok(state.balances.get(&key).copied().unwrap_or(0))
        }

        async fn ft_total_supply(&self, _contract: &AccountId) -> ReadResult<u128> {
            Ok(self.read("ft_total_supply")?.total_supply)
        }

        async fn allowance(
            &self,
            contract: &AccountId,
            owner: &AccountId,
            spender: &AccountId,
        ) -> ReadResult<u128> {
            let state = self.read("allowance")?;
            let key = (contract.clone(), owner.clone(), spender.clone());
            Ok(state.allowances.get(&key).copied().unwrap_or(0))
        }

        async fn max_supply(&self) -> ReadResult<u128> {
            Ok(self.read("max_supply")?.max_supply)
        }

        async fn nft_price(&self) -> ReadResult<u128> {
            Ok(self.read("nft_price")?.nft_price)
        }

        async fn total_minted(&self) -> ReadResult<u64> {
            Ok(self.read("total_minted")?.total_minted)
        }

        async fn nft_balance_of(&self, owner: &AccountId) -> ReadResult<u64> {
            let state = self.read("nft_balance_of")?;
            Ok(state.owned.get(owner).map(|ids| ids.len() as u64).unwrap_or(0))
        }

        async fn tokens_of_owner(&self, owner: &AccountId) -> ReadResult<Vec<u64>> {
            let state = self.read("tokens_of_owner")?;
            Ok(state.owned.get(owner).cloned().unwrap_or_default())
        }

        async fn vault_stats(&self) -> ReadResult<VaultStatsView> {
            Ok(self.read("get_vault_stats")?.vault_stats.clone())
        }

        async fn floor_price(&self) -> ReadResult<u128> {
            Ok(self.read("get_floor_price")?.floor_price)
        }

        async fn nft_infos(&self, token_ids: &[u64]) -> ReadResult<Vec<Option<NftInfoView>>> {
            let state = self.read("get_nft_infos")?;
            Ok(token_ids
                .iter()
                .map(|id| {
                    if state.unreadable_nfts.contains(id) {
                        None
                    } else {
                        state.nft_infos.get(id).cloned()
                    }
                })
                .collect())
        }

        async fn calculate_pending(&self, token_id: u64) -> ReadResult<u128> {
            let state = self.read("calculate_pending")?;
            Ok(state
                .nft_infos
                .get(&token_id)
                .map(|info| info.pending_tokens.0)
                .unwrap_or(0))
        }

        async fn min_redemption_amount(&self) -> ReadResult<u128> {
            Ok(self.read("min_redemption_amount")?.min_redemption)
        }

        async fn total_accrued_tokens(&self) -> ReadResult<u128> {
            Ok(self.read("get_total_accrued_tokens")?.total_accrued)
        }

        async fn bonus_balance(&self, account: &AccountId) -> ReadResult<u128> {
            let state = self.read("user_bonus_balance")?;
            Ok(state.bonus.get(account).copied().unwrap_or(0))
        }

        async fn recent_snapshots(&self, count: u32) -> ReadResult<Vec<SnapshotView>> {
            let state = self.read("get_recent_snapshots")?;
            let skip = state.snapshots.len().saturating_sub(count as usize);
            Ok(state.snapshots[skip..].to_vec())
        }

        async fn referral_user(&self, account: &AccountId) -> ReadResult<Option<ReferralUserView>> {
            let state = self.read("get_user")?;
            Ok(state.referral_users.get(account).cloned())
        }

        async fn is_user_registered(&self, account: &AccountId) -> ReadResult<bool> {
            let state = self.read("is_user_registered")?;
            Ok(state
                .referral_users
                .get(account)
                .map(|u| u.is_registered)
                .unwrap_or(false))
        }

        async fn team_by_levels(&self, account: &AccountId) -> ReadResult<Vec<u64>> {
            let state = self.read("get_team_by_levels")?;
            Ok(state.team_levels.get(account).cloned().unwrap_or_default())
        }

        async fn commission_count(&self, account: &AccountId) -> ReadResult<u64> {
            let state = self.read("get_commission_count")?;
            Ok(state.commissions.get(account).copied().unwrap_or(0))
        }

        async fn submit(&self, action: &WriteAction) -> Result<TxHash, WriteError> {
            let hang = {
                let mut state = self.state.lock().unwrap();
                state.write_log.push(format!("submit:{}", action.name()));
                if let Some(error) = state.submit_failures.get(action.name()) {
                    return Err(error.clone());
                }
                state.hanging_submits.contains(action.name())
            };
            if hang {
                return std::future::pending().await;
            }

            let mut state = self.state.lock().unwrap();
            state.next_tx += 1;
            let tx = TxHash(format!("tx-{}", state.next_tx));
            state.submitted.insert(tx.clone(), action.clone());
            Ok(tx)
        }

        async fn confirm(&self, tx: &TxHash) -> Result<TxReceipt, WriteError> {
            let behavior = {
                let mut state = self.state.lock().unwrap();
                let action = state
                    .submitted
                    .get(tx)
                    .cloned()
                    .ok_or_else(|| WriteError::Rejected(format!("unknown transaction {tx}")))?;
                state.write_log.push(format!("confirm:{}", action.name()));
                state
                    .confirm_behavior
                    .get(action.name())
                    .cloned()
                    .unwrap_or(ConfirmBehavior::Succeed)
            };

            match behavior {
                ConfirmBehavior::Succeed => Ok(TxReceipt {
                    tx_hash: tx.clone(),
                }),
                ConfirmBehavior::Fail(error) => Err(error),
                ConfirmBehavior::Hang => std::future::pending().await,
            }
        }
    }
}

/// Builder pattern for gateway state in tests.
#[cfg(test)]
pub mod builders {
    use std::sync::Arc;

    use near_api::AccountId;
    use near_sdk::json_types::{U128, U64};

    use super::mock::{MockGateway, MockState};
    use crate::config::{ClientConfig, ContractAddresses};
    use crate::gateway::{NftInfoView, VaultStatsView};
    use crate::units::unit;

    pub const OWNER: &str = "alice.test.near";

    pub fn owner() -> AccountId {
        OWNER.parse().unwrap()
    }

    pub fn test_config() -> ClientConfig {
        let root: AccountId = "test.near".parse().unwrap();
        ClientConfig::local(&root, "http://127.0.0.1:3030").unwrap()
    }

    /// `whole` reward tokens in base units.
    pub fn tokens(whole: u128) -> u128 {
        whole * unit(18)
    }

    /// An active NFT that has been distributed to, with `pending` whole tokens.
    pub fn active_nft(pending: u128) -> NftInfoView {
        NftInfoView {
            token_balance: U128(tokens(5)),
            pending_tokens: U128(tokens(pending)),
            total_earned: U128(tokens(5 + pending)),
            is_active: true,
            last_distribution_time: U64(1_700_000_000),
            ..Default::default()
        }
    }

    /// Builder for a [`MockGateway`] with sensible defaults.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let gateway = GatewayBuilder::new()
    ///     .stable_decimals(6)
    ///     .owned_nft(1, active_nft(2))
    ///     .build();
    /// ```
    pub struct GatewayBuilder {
        contracts: ContractAddresses,
        state: MockState,
    }

    impl GatewayBuilder {
        pub fn new() -> Self {
            let contracts = test_config().contracts;
            let mut state = MockState::default();
            state.decimals.insert(contracts.token.clone(), 18);
            state.decimals.insert(contracts.stablecoin.clone(), 6);
            state.max_supply = tokens(1_000_000_000);
            Self { contracts, state }
        }

        pub fn contracts(&self) -> &ContractAddresses {
            &self.contracts
        }

        pub fn stable_decimals(mut self, decimals: u8) -> Self {
            self.state
                .decimals
                .insert(self.contracts.stablecoin.clone(), decimals);
            self
        }

        /// Adds an NFT owned by [`OWNER`].
        pub fn owned_nft(mut self, token_id: u64, info: NftInfoView) -> Self {
            self.state.owned.entry(owner()).or_default().push(token_id);
            self.state.nft_infos.insert(token_id, info);
            self
        }

        pub fn vault_stats(mut self, stats: VaultStatsView) -> Self {
            self.state.floor_price = stats.floor_price.0;
            self.state.vault_stats = stats;
            self
        }

        pub fn total_accrued(mut self, raw: u128) -> Self {
            self.state.total_accrued = raw;
            self
        }

        pub fn max_supply(mut self, raw: u128) -> Self {
            self.state.max_supply = raw;
            self
        }

        pub fn nft_price(mut self, raw: u128) -> Self {
            self.state.nft_price = raw;
            self
        }

        pub fn token_balance(mut self, account: &AccountId, raw: u128) -> Self {
            let key = (self.contracts.token.clone(), account.clone());
            self.state.balances.insert(key, raw);
            self
        }

        pub fn token_allowance(mut self, owner: &AccountId, spender: &AccountId, raw: u128) -> Self {
            let key = (self.contracts.token.clone(), owner.clone(), spender.clone());
            self.state.allowances.insert(key, raw);
            self
        }

        pub fn stable_allowance(mut self, owner: &AccountId, spender: &AccountId, raw: u128) -> Self {
            let key = (self.contracts.stablecoin.clone(), owner.clone(), spender.clone());
            self.state.allowances.insert(key, raw);
            self
        }

        pub fn with(mut self, f: impl FnOnce(&mut MockState)) -> Self {
            f(&mut self.state);
            self
        }

        pub fn build(self) -> Arc<MockGateway> {
            Arc::new(MockGateway::new(self.contracts, self.state))
        }
    }
}
