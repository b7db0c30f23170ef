//! # Safe Multiplication and Division
//!
//! Overflow-safe `(x * y) / denominator` using 256-bit intermediate
//! arithmetic. Used when scaling amounts between decimal precisions and when
//! estimating redemption payouts from a per-token price.
//!
//! ## Rounding Modes
//!
//! - `Down`: Round towards zero (floor)
//! - `Up`: Round away from zero (ceiling)

use super::U256;

/// Rounding direction for division operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Round towards zero (floor division).
    Down,
    /// Round away from zero (ceiling division).
    Up,
}

/// Performs `(x * y) / denominator` with configurable rounding.
///
/// Returns `None` when `denominator` is zero or the result does not fit in a
/// `u128`.
///
/// # Example
///
/// ```
/// use limitless_client::units::{mul_div, Rounding};
///
/// // 25 stablecoin units per token, 3 tokens
/// assert_eq!(mul_div(3, 25, 1, Rounding::Down), Some(75));
/// assert_eq!(mul_div(10, 1, 3, Rounding::Up), Some(4));
/// ```
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }

    let numerator = U256::from(x) * U256::from(y);
    let denominator = U256::from(denominator);
    let mut result = numerator / denominator;
    let remainder = numerator % denominator;

    if rounding == Rounding::Up && remainder > U256::zero() {
        result = result + U256::one();
    }

    if result > U256::from(u128::MAX) {
        return None;
    }
    Some(result.as_u128())
}
