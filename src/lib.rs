//! # LIMITLESS Client
//!
//! A client for the LIMITLESS NFT reward system on NEAR. It reads the NFT,
//! Token, Vault, Referral and Stablecoin contracts and sequences the writes a
//! holder makes against them.
//!
//! - **Reads**: batched, decimal-normalized contract state that never fails
//!   (unreadable values degrade to zero)
//! - **Accrual estimation**: a live pending-rewards estimate that ticks
//!   between on-chain refreshes and is reset by each of them
//! - **Floor price**: the vault's price, or a documented fallback when the
//!   vault reports zero
//! - **Writes**: claim-then-redeem, approve-then-redeem and approve-then-mint
//!   with one combined status
//!
//! ## Architecture
//!
//! - [`gateway`]: typed contract-call boundary and its `near-api` implementation
//! - [`decimals`]: per-contract decimal precision
//! - [`reader`]: the read aggregator
//! - [`accrual`]: accrual estimator and its ticker task
//! - [`floor_price`]: floor-price resolution
//! - [`orchestrator`]: write sequencing and status
//! - [`refresh`]: periodic and on-demand re-reads
//! - [`format`]: display formatting
//! - [`referral`]: referral links and the cached referrer
//! - [`units`], [`config`], [`error`], [`events`]: supporting types

use std::sync::Arc;

use near_api::{AccountId, Signer};

pub mod accrual;
pub mod config;
pub mod decimals;
pub mod error;
pub mod events;
pub mod floor_price;
pub mod format;
pub mod gateway;
pub mod orchestrator;
pub mod reader;
pub mod referral;
pub mod refresh;
pub mod units;

#[cfg(test)]
pub mod test_utils;

use accrual::AccrualTicker;
use config::ClientConfig;
use decimals::DecimalsResolver;
use error::ConfigError;
use format::CurrencyFormat;
use gateway::near::NearGateway;
use gateway::ContractGateway;
use orchestrator::WriteOrchestrator;
use reader::ContractReader;
use referral::ReferralCache;
use refresh::RefreshScheduler;

/// Entry point tying the components to one configuration and gateway.
pub struct LimitlessClient<G> {
    config: ClientConfig,
    reader: ContractReader<G>,
    orchestrator: WriteOrchestrator<G>,
    ticker: Arc<AccrualTicker>,
}

impl<G: ContractGateway + 'static> LimitlessClient<G> {
    pub fn new(config: ClientConfig, gateway: Arc<G>) -> Self {
        let decimals = Arc::new(DecimalsResolver::new(gateway.clone()));
        let reader = ContractReader::new(gateway, config.contracts.clone(), decimals);
        let orchestrator = WriteOrchestrator::new(reader.clone(), config.confirmation_timeout);
        let ticker = Arc::new(AccrualTicker::new(
            config.accrual.clone(),
            config.refresh.tick(),
        ));
        Self {
            config,
            reader,
            orchestrator,
            ticker,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn reader(&self) -> &ContractReader<G> {
        &self.reader
    }

    pub fn orchestrator(&self) -> &WriteOrchestrator<G> {
        &self.orchestrator
    }

    /// The pending-rewards ticker. Not started until [`AccrualTicker::start`].
    pub fn ticker(&self) -> &Arc<AccrualTicker> {
        &self.ticker
    }

    /// Refresh scheduler for `owner`, reconciling this client's ticker and
    /// re-reading after every successful write. Not started yet.
    pub fn monitor(&self, owner: AccountId) -> RefreshScheduler<G> {
        RefreshScheduler::new(
            self.reader.clone(),
            owner,
            self.ticker.clone(),
            self.config.refresh.clone(),
            self.orchestrator.refresh_trigger(),
        )
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::default().with_scientific_threshold(self.config.scientific_threshold)
    }

    pub fn referral_cache(&self) -> Option<ReferralCache> {
        self.config
            .referral_cache_path
            .as_ref()
            .map(|path| ReferralCache::new(path.clone()))
    }
}

impl LimitlessClient<NearGateway> {
    /// Read-only client over the configured network.
    pub fn connect(config: ClientConfig) -> Result<Self, ConfigError> {
        let gateway = NearGateway::new(config.network.network_config()?, config.contracts.clone());
        Ok(Self::new(config, Arc::new(gateway)))
    }

    /// Client that signs writes as `account_id`.
    pub fn connect_with_signer(
        config: ClientConfig,
        account_id: AccountId,
        signer: Arc<Signer>,
    ) -> Result<Self, ConfigError> {
        let gateway = NearGateway::new(config.network.network_config()?, config.contracts.clone())
            .with_signer(account_id, signer);
        Ok(Self::new(config, Arc::new(gateway)))
    }
}
