//! # Test Helpers Module
//!
//! Common infrastructure for the integration tests: sandbox connection
//! helpers and builders for reward records.
//!
//! ## Modules
//!
//! - [`test_builder`]: Builder pattern for owner reward scenarios
//!
//! ## Key Functions
//!
//! - [`create_network_config`]: Configures connection to sandbox
//! - [`setup_genesis_account`]: Genesis credentials used to create accounts
//! - [`create_user_account`]: Creates funded test accounts
//! - [`sandbox_client_config`]: Client configuration pointing at the sandbox

use limitless_client::config::ClientConfig;
use near_api::{signer, Account, AccountId, NearToken, NetworkConfig, RPCEndpoint, Signer};
use near_sandbox::{GenesisAccount, Sandbox};
use std::sync::Arc;

pub mod test_builder;

// ============================================================================
// Constants
// ============================================================================

/// One whole reward token in base units (18 decimals).
#[allow(dead_code)]
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// One whole USDC in base units (6 decimals).
#[allow(dead_code)]
pub const ONE_USDC: u128 = 1_000_000;

// ============================================================================
// Sandbox Helpers
// ============================================================================

/// Creates a network configuration for connecting to the sandbox.
#[allow(dead_code)]
pub fn create_network_config(sandbox: &Sandbox) -> NetworkConfig {
    NetworkConfig {
        network_name: "sandbox".to_string(),
        rpc_endpoints: vec![RPCEndpoint::new(sandbox.rpc_addr.parse().unwrap())],
        ..NetworkConfig::testnet()
    }
}

/// Retrieves the genesis account credentials from the sandbox.
///
/// # Returns
///
/// A tuple of (account_id, signer) for the genesis account.
#[allow(dead_code)]
pub async fn setup_genesis_account() -> (AccountId, Arc<Signer>) {
    let genesis_account_default = GenesisAccount::default();
    let genesis_account_id: AccountId = genesis_account_default.account_id;
    let genesis_signer: Arc<Signer> = Signer::new(Signer::from_secret_key(
        genesis_account_default.private_key.parse().unwrap(),
    ))
    .unwrap();

    (genesis_account_id, genesis_signer)
}

/// Creates a new user account funded with NEAR.
///
/// # Arguments
///
/// * `network_config` - Network connection configuration
/// * `genesis_account_id` - Account to fund the new account
/// * `genesis_signer` - Signer for the genesis account
/// * `user_name` - Name prefix for the account (e.g., "alice" -> "alice.{genesis}")
#[allow(dead_code)]
pub async fn create_user_account(
    network_config: &NetworkConfig,
    genesis_account_id: &AccountId,
    genesis_signer: &Arc<Signer>,
    user_name: &str,
) -> Result<(AccountId, Arc<Signer>), Box<dyn std::error::Error + Send + Sync>> {
    let user_id: AccountId = format!("{}.{}", user_name, genesis_account_id).parse()?;
    let user_secret_key = signer::generate_secret_key()?;
    let user_signer: Arc<Signer> = Signer::new(Signer::from_secret_key(user_secret_key.clone())).unwrap();

    Account::create_account(user_id.clone())
        .fund_myself(genesis_account_id.clone(), NearToken::from_near(5))
        .public_key(user_secret_key.public_key())
        .unwrap()
        .with_signer(genesis_signer.clone())
        .send_to(network_config)
        .await?;

    println!("User account created: {}", user_id);

    Ok((user_id, user_signer))
}

/// Client configuration with every contract as a sub-account of the genesis
/// account. None of them has code deployed.
#[allow(dead_code)]
pub fn sandbox_client_config(sandbox: &Sandbox, root: &AccountId) -> ClientConfig {
    ClientConfig::local(root, &sandbox.rpc_addr).unwrap()
}
