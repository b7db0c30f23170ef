//! # Client Configuration
//!
//! Everything the client needs is passed in explicitly at construction time.
//! Contract account ids are required: a config file that omits one fails to
//! load. [`ClientConfig::local`] exists for sandbox and test setups only.
//!
//! ## Example
//!
//! ```json
//! {
//!   "network": "testnet",
//!   "contracts": {
//!     "nft": "nft.limitless.testnet",
//!     "token": "token.limitless.testnet",
//!     "vault": "vault.limitless.testnet",
//!     "referral": "referral.limitless.testnet",
//!     "stablecoin": "usdc.limitless.testnet"
//!   },
//!   "refresh": { "vault_secs": 15, "nft_secs": 30 }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use near_api::{AccountId, NetworkConfig, RPCEndpoint};
use serde::Deserialize;

use crate::error::ConfigError;

/// Account ids of the external contracts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractAddresses {
    pub nft: AccountId,
    pub token: AccountId,
    pub vault: AccountId,
    pub referral: AccountId,
    pub stablecoin: AccountId,
}

/// Which NEAR network to talk to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Mainnet,
    Testnet,
    Custom { name: String, rpc_url: String },
}

impl Network {
    pub fn network_config(&self) -> Result<NetworkConfig, ConfigError> {
        match self {
            Network::Mainnet => Ok(NetworkConfig::mainnet()),
            Network::Testnet => Ok(NetworkConfig::testnet()),
            Network::Custom { name, rpc_url } => {
                let url = rpc_url
                    .parse()
                    .map_err(|_| ConfigError::InvalidRpcUrl(rpc_url.clone()))?;
                Ok(NetworkConfig {
                    network_name: name.clone(),
                    rpc_endpoints: vec![RPCEndpoint::new(url)],
                    ..NetworkConfig::testnet()
                })
            }
        }
    }
}

/// Periodic refresh cadence.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshIntervals {
    pub vault_secs: u64,
    pub nft_secs: u64,
    pub tick_millis: u64,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            vault_secs: 15,
            nft_secs: 30,
            tick_millis: 1_000,
        }
    }
}

impl RefreshIntervals {
    pub fn vault(&self) -> Duration {
        Duration::from_secs(self.vault_secs.max(1))
    }

    pub fn nft(&self) -> Duration {
        Duration::from_secs(self.nft_secs.max(1))
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

/// Accrual model used between authoritative refreshes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AccrualSettings {
    /// Tokens each active NFT accrues per day.
    pub tokens_per_day: f64,
    /// Guaranteed credit for an active NFT that was never distributed to.
    pub base_credit: f64,
}

impl Default for AccrualSettings {
    fn default() -> Self {
        Self {
            tokens_per_day: 1.0,
            base_credit: 1.0,
        }
    }
}

/// Full client configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub network: Network,
    pub contracts: ContractAddresses,
    pub refresh: RefreshIntervals,
    pub accrual: AccrualSettings,
    pub confirmation_timeout: Duration,
    pub scientific_threshold: f64,
    pub referral_cache_path: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RawContracts {
    nft: String,
    token: String,
    vault: String,
    referral: String,
    stablecoin: String,
}

#[derive(Deserialize)]
struct RawConfig {
    network: Network,
    contracts: RawContracts,
    #[serde(default)]
    refresh: RefreshIntervals,
    #[serde(default)]
    accrual: AccrualSettings,
    #[serde(default = "default_confirmation_timeout_secs")]
    confirmation_timeout_secs: u64,
    #[serde(default = "default_scientific_threshold")]
    scientific_threshold: f64,
    #[serde(default)]
    referral_cache_path: Option<PathBuf>,
}

fn default_confirmation_timeout_secs() -> u64 {
    30
}

fn default_scientific_threshold() -> f64 {
    1e-6
}

fn parse_account(field: &'static str, value: String) -> Result<AccountId, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidAccountId { field, value })
}

impl ClientConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text)?;
        let contracts = ContractAddresses {
            nft: parse_account("contracts.nft", raw.contracts.nft)?,
            token: parse_account("contracts.token", raw.contracts.token)?,
            vault: parse_account("contracts.vault", raw.contracts.vault)?,
            referral: parse_account("contracts.referral", raw.contracts.referral)?,
            stablecoin: parse_account("contracts.stablecoin", raw.contracts.stablecoin)?,
        };

        Ok(Self {
            network: raw.network,
            contracts,
            refresh: raw.refresh,
            accrual: raw.accrual,
            confirmation_timeout: Duration::from_secs(raw.confirmation_timeout_secs),
            scientific_threshold: raw.scientific_threshold,
            referral_cache_path: raw.referral_cache_path,
        })
    }

    /// Sandbox/test configuration with every contract deployed as a
    /// sub-account of `root` (`nft.<root>`, `vault.<root>`, ...).
    pub fn local(root: &AccountId, rpc_url: &str) -> Result<Self, ConfigError> {
        let sub = |name: &'static str| parse_account(name, format!("{}.{}", name, root));
        Ok(Self {
            network: Network::Custom {
                name: "sandbox".to_string(),
                rpc_url: rpc_url.to_string(),
            },
            contracts: ContractAddresses {
                nft: sub("nft")?,
                token: sub("token")?,
                vault: sub("vault")?,
                referral: sub("referral")?,
                stablecoin: sub("usdc")?,
            },
            refresh: RefreshIntervals::default(),
            accrual: AccrualSettings::default(),
            confirmation_timeout: Duration::from_secs(default_confirmation_timeout_secs()),
            scientific_threshold: default_scientific_threshold(),
            referral_cache_path: None,
        })
    }
}
