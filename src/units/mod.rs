//! # Units Module
//!
//! Conversion between on-chain base units and human-readable decimal strings.
//!
//! All fungible amounts cross the contract boundary as `u128` base units.
//! Reward tokens always carry [`TOKEN_DECIMALS`]; stablecoin amounts carry the
//! precision resolved by [`crate::decimals::DecimalsResolver`].
//!
//! ## Module Organization
//!
//! - [`amount`]: the [`Amount`] value type and string parsing/formatting
//! - [`mul_div`]: safe multiplication and division with configurable rounding

pub mod amount;
pub mod mul_div;

use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer used for overflow-free intermediates.
    pub struct U256(4);
}

pub use amount::{format_units, parse_units, Amount};
pub use mul_div::{mul_div, Rounding};

/// Decimal places of the reward token. Fixed by the token contract.
pub const TOKEN_DECIMALS: u8 = 18;

/// Decimal places assumed when a token's metadata cannot be read.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest decimal precision accepted from token metadata.
pub const MAX_DECIMALS: u8 = 36;

/// Returns `10^decimals` as a `u128`.
///
/// `decimals` above [`MAX_DECIMALS`] are clamped.
pub fn unit(decimals: u8) -> u128 {
    10u128.pow(decimals.min(MAX_DECIMALS) as u32)
}
