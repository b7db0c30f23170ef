//! # Decimals Resolver
//!
//! Resolves a fungible token's decimal precision from `ft_metadata`, once per
//! contract. Unreadable or out-of-range metadata falls back to
//! [`DEFAULT_DECIMALS`] so downstream arithmetic always has a scale; the
//! fallback is logged and not cached, so the next lookup retries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use near_api::AccountId;

use crate::events::DecimalsUnresolved;
use crate::gateway::ContractGateway;
use crate::units::{DEFAULT_DECIMALS, MAX_DECIMALS};

pub struct DecimalsResolver<G> {
    gateway: Arc<G>,
    resolved: Mutex<HashMap<AccountId, u8>>,
}

impl<G: ContractGateway> DecimalsResolver<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Decimal places of `contract`, in `[0, 36]`.
    pub async fn decimals_of(&self, contract: &AccountId) -> u8 {
        if let Some(decimals) = self.cached(contract) {
            return decimals;
        }

        let reason = match self.gateway.ft_metadata(contract).await {
            Ok(metadata) if metadata.decimals <= MAX_DECIMALS => {
                if let Ok(mut resolved) = self.resolved.lock() {
                    resolved.insert(contract.clone(), metadata.decimals);
                }
                return metadata.decimals;
            }
            Ok(metadata) => format!("decimals {} out of range", metadata.decimals),
            Err(e) => e.to_string(),
        };

        DecimalsUnresolved {
            contract: contract.as_str(),
            reason: &reason,
            fallback: DEFAULT_DECIMALS,
        }
        .emit();
        DEFAULT_DECIMALS
    }

    fn cached(&self, contract: &AccountId) -> Option<u8> {
        self.resolved.lock().ok()?.get(contract).copied()
    }
}
