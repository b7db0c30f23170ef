//! # Display Formatting
//!
//! Human-readable rendering of currency values, floor prices and token
//! amounts.
//!
//! A non-zero value is never rendered as zero: whenever a fixed-point
//! rendering would show only zeros, exponential notation is used instead.
//! This matters for floor prices derived from `backing / max_supply`, which
//! can be as small as `1e-15`.

use crate::units::Amount;

/// Options for [`format_currency`].
#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyFormat {
    pub symbol: String,
    /// Decimal places for values of at least 1 and for abbreviated values.
    pub precision: usize,
    /// Abbreviate thousands and above with K/M/B/T.
    pub abbreviate: bool,
    /// Non-zero magnitudes below this use exponential notation.
    pub scientific_threshold: f64,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            precision: 2,
            abbreviate: true,
            scientific_threshold: 1e-6,
        }
    }
}

impl CurrencyFormat {
    pub fn with_scientific_threshold(mut self, threshold: f64) -> Self {
        self.scientific_threshold = threshold;
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }
}

const ABBREVIATIONS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Formats a currency value.
///
/// ```
/// use limitless_client::format::{format_currency, CurrencyFormat};
///
/// let fmt = CurrencyFormat::default();
/// assert_eq!(format_currency(1234.5, &fmt), "$1.23K");
/// assert_eq!(format_currency(0.5, &fmt), "$0.500000");
/// assert_eq!(format_currency(2.75e-15, &fmt), "$2.75e-15");
/// ```
pub fn format_currency(value: f64, format: &CurrencyFormat) -> String {
    let symbol = &format.symbol;
    if !value.is_finite() || value == 0.0 {
        return format!("{symbol}0.00");
    }

    let magnitude = value.abs();
    let exp_places = format.precision.min(4);
    if magnitude < format.scientific_threshold {
        return format!("{symbol}{value:.exp_places$e}");
    }

    if format.abbreviate {
        if let Some((scale, suffix)) = ABBREVIATIONS.iter().find(|(scale, _)| magnitude >= *scale) {
            let scaled = value / scale;
            return format!("{symbol}{scaled:.prec$}{suffix}", prec = format.precision);
        }
    }

    let places = if magnitude < 1.0 {
        format.precision.max(6)
    } else {
        format.precision
    };
    format!("{symbol}{}", fixed_or_exponential(value, places, exp_places))
}

/// Formats a floor price in stablecoin per token, using the symbol and
/// scientific-notation threshold of `format`.
///
/// ```
/// use limitless_client::format::{format_floor_price, CurrencyFormat};
///
/// let fmt = CurrencyFormat::default();
/// assert_eq!(format_floor_price(25.0, &fmt), "$25.0000");
/// assert_eq!(format_floor_price(0.0125, &fmt), "$0.01250000");
/// assert_eq!(format_floor_price(1e-7, &fmt), "$1.00e-7");
/// ```
pub fn format_floor_price(value: f64, format: &CurrencyFormat) -> String {
    let symbol = &format.symbol;
    if !value.is_finite() || value == 0.0 {
        return format!("{symbol}0.00");
    }

    let magnitude = value.abs();
    if magnitude < format.scientific_threshold {
        return format!("{symbol}{value:.2e}");
    }
    let places = if magnitude < 1.0 { 8 } else { 4 };
    format!("{symbol}{}", fixed_or_exponential(value, places, 2))
}

/// Formats a token amount with `places` decimals.
pub fn format_tokens(amount: Amount, places: usize) -> String {
    let value = amount.to_f64();
    if value == 0.0 {
        return format!("{:.places$}", 0.0);
    }
    fixed_or_exponential(value, places, 2)
}

fn fixed_or_exponential(value: f64, places: usize, exp_places: usize) -> String {
    let fixed = format!("{value:.places$}");
    let all_zero = fixed.bytes().all(|b| matches!(b, b'0' | b'.' | b'-'));
    if all_zero && value != 0.0 {
        format!("{value:.exp_places$e}")
    } else {
        fixed
    }
}
