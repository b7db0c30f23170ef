//! # Floor-Price Resolver
//!
//! Produces the stablecoin-per-token redemption price. The vault's own
//! `get_floor_price` is preferred; when it reports zero while the vault holds
//! backing (the contract's integer division underflows once the distributed
//! supply is large), the price is derived as `backing / denominator`.
//!
//! ## Denominator Order
//!
//! Each entry is used only when every previous one is zero:
//!
//! 1. Live accrued tokens (`get_total_accrued_tokens`)
//! 2. Active NFT count (each NFT guarantees at least one token)
//! 3. Token `max_supply` (full dilution, deliberately tiny)

use serde::Serialize;

use crate::events::StaleFloorPrice;
use crate::units::{mul_div, Amount, Rounding, TOKEN_DECIMALS};

/// Where a resolved floor price came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorPriceSource {
    Authoritative,
    AccruedTokens,
    ActiveNfts,
    MaxSupply,
    Unavailable,
}

impl FloorPriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloorPriceSource::Authoritative => "authoritative",
            FloorPriceSource::AccruedTokens => "accrued_tokens",
            FloorPriceSource::ActiveNfts => "active_nfts",
            FloorPriceSource::MaxSupply => "max_supply",
            FloorPriceSource::Unavailable => "unavailable",
        }
    }
}

/// Everything the resolver looks at. Stablecoin values carry the resolved
/// stablecoin decimals; token counts carry 18 decimals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorPriceInputs {
    /// Vault-reported price: stablecoin base units per whole token.
    pub authoritative: Amount,
    pub total_backing: Amount,
    pub accrued_tokens: Amount,
    pub active_nfts: u64,
    pub max_supply: Amount,
}

/// A resolved floor price in stablecoin per whole token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorPrice {
    pub value: f64,
    pub source: FloorPriceSource,
    /// Exact price in stablecoin base units when it came from the vault.
    exact: Option<Amount>,
}

impl FloorPrice {
    pub fn unavailable() -> Self {
        Self {
            value: 0.0,
            source: FloorPriceSource::Unavailable,
            exact: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.source != FloorPriceSource::Unavailable
    }

    /// Estimated stablecoin payout for redeeming `tokens` at this price.
    ///
    /// Exact integer arithmetic when the vault reported the price; a rounded
    /// down estimate otherwise. `None` if the payout does not fit in `u128`.
    pub fn redemption_value(&self, tokens: Amount, stable_decimals: u8) -> Option<Amount> {
        if let Some(exact) = self.exact {
            let token_unit = 10u128.pow(TOKEN_DECIMALS as u32);
            let raw = mul_div(tokens.raw, exact.raw, token_unit, Rounding::Down)?;
            return Some(Amount::new(raw, exact.decimals));
        }

        let scaled = tokens.to_f64() * self.value * 10f64.powi(stable_decimals as i32);
        if !scaled.is_finite() || scaled >= u128::MAX as f64 {
            return None;
        }
        let raw = if scaled > 0.0 { scaled.floor() as u128 } else { 0 };
        Some(Amount::new(raw, stable_decimals))
    }
}

/// Resolves the floor price from `inputs`.
///
/// Emits a `stale_floor_price` event whenever the vault reports zero while
/// holding backing.
pub fn resolve_floor_price(inputs: &FloorPriceInputs) -> FloorPrice {
    if !inputs.authoritative.is_zero() {
        return FloorPrice {
            value: inputs.authoritative.to_f64(),
            source: FloorPriceSource::Authoritative,
            exact: Some(inputs.authoritative),
        };
    }

    if inputs.total_backing.is_zero() {
        return FloorPrice::unavailable();
    }

    let backing = inputs.total_backing.to_f64();
    let fallback = if !inputs.accrued_tokens.is_zero() {
        Some((inputs.accrued_tokens.to_f64(), FloorPriceSource::AccruedTokens))
    } else if inputs.active_nfts > 0 {
        Some((inputs.active_nfts as f64, FloorPriceSource::ActiveNfts))
    } else if !inputs.max_supply.is_zero() {
        Some((inputs.max_supply.to_f64(), FloorPriceSource::MaxSupply))
    } else {
        None
    };

    let price = match fallback {
        Some((denominator, source)) => FloorPrice {
            value: backing / denominator,
            source,
            exact: None,
        },
        None => FloorPrice::unavailable(),
    };

    StaleFloorPrice {
        total_backing: inputs.total_backing.to_string(),
        fallback_source: price.source.as_str(),
        fallback_price: price.value,
    }
    .emit();

    price
}
