use std::fmt;

use serde::{Deserialize, Serialize};

use super::{unit, MAX_DECIMALS, TOKEN_DECIMALS, U256};
use crate::error::AmountError;

/// An integer count of base units together with its decimal precision.
///
/// Every monetary value in the client carries its precision, so converting to
/// a human-readable value is never ambiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    pub raw: u128,
    pub decimals: u8,
}

impl Amount {
    pub const fn new(raw: u128, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub const fn zero(decimals: u8) -> Self {
        Self { raw: 0, decimals }
    }

    /// A reward-token amount (always 18 decimals).
    pub const fn tokens(raw: u128) -> Self {
        Self::new(raw, TOKEN_DECIMALS)
    }

    /// Parses a human-decimal string such as `"1.5"` at the given precision.
    pub fn parse(value: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self::new(parse_units(value, decimals)?, decimals))
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Human-scale value as a float. Precision loss is acceptable here: this
    /// feeds display and estimation only, never a write.
    pub fn to_f64(&self) -> f64 {
        self.raw as f64 / 10f64.powi(self.decimals.min(MAX_DECIMALS) as i32)
    }

    /// Adds two amounts of the same precision, saturating at `u128::MAX`.
    pub fn saturating_add(self, other: Amount) -> Amount {
        debug_assert_eq!(self.decimals, other.decimals);
        Amount::new(self.raw.saturating_add(other.raw), self.decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.raw, self.decimals))
    }
}

/// Converts a human-decimal string into base units at `decimals` precision.
///
/// Accepts an optional fractional part (`"12"`, `"12.5"`, `".5"`). Rejects
/// signs, exponents, separators, more fractional digits than `decimals`, and
/// values that do not fit in a `u128`.
///
/// ```
/// use limitless_client::units::parse_units;
///
/// assert_eq!(parse_units("1.5", 18).unwrap(), 1_500_000_000_000_000_000);
/// assert_eq!(parse_units("50", 6).unwrap(), 50_000_000);
/// ```
pub fn parse_units(value: &str, decimals: u8) -> Result<u128, AmountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Malformed(value.to_string()));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::Malformed(value.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooManyFractionDigits {
            value: value.to_string(),
            decimals,
        });
    }

    let overflow = || AmountError::Overflow(value.to_string());

    let whole = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| overflow())?
    };
    let fraction = if fraction.is_empty() {
        U256::zero()
    } else {
        let padding = decimals as usize - fraction.len();
        U256::from_dec_str(fraction).map_err(|_| overflow())? * U256::exp10(padding)
    };

    let total = whole
        .checked_mul(U256::exp10(decimals as usize))
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(overflow)?;

    if total > U256::from(u128::MAX) {
        return Err(overflow());
    }
    Ok(total.as_u128())
}

/// Converts base units into the shortest exact decimal string.
///
/// Trailing fractional zeros are dropped; whole values have no decimal point.
///
/// ```
/// use limitless_client::units::format_units;
///
/// assert_eq!(format_units(1_500_000_000_000_000_000, 18), "1.5");
/// assert_eq!(format_units(25_000_000, 6), "25");
/// ```
pub fn format_units(raw: u128, decimals: u8) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    if decimals == 0 {
        return raw.to_string();
    }

    let base = unit(decimals);
    let whole = raw / base;
    let fraction = raw % base;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
