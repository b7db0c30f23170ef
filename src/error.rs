//! Error types for the client.
//!
//! Read failures never escape the reader; they are absorbed with defaults.
//! Write failures are returned to the caller and left retryable.

use std::time::Duration;

/// A contract read failed or returned data the client could not decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("RPC call {method} failed: {message}")]
    Rpc { method: String, message: String },
    #[error("Could not decode {method} response: {message}")]
    Decode { method: String, message: String },
}

impl ReadError {
    pub fn rpc(method: &str, message: impl ToString) -> Self {
        Self::Rpc {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    pub fn decode(method: &str, message: impl ToString) -> Self {
        Self::Decode {
            method: method.to_string(),
            message: message.to_string(),
        }
    }
}

/// A human-decimal amount string could not be converted to base units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,
    #[error("Amount is not a plain decimal number: {0}")]
    Malformed(String),
    #[error("Amount {value} has more than {decimals} fractional digits")]
    TooManyFractionDigits { value: String, decimals: u8 },
    #[error("Amount {0} does not fit in 128 bits")]
    Overflow(String),
    #[error("Unsupported decimal precision: {0}")]
    UnsupportedDecimals(u8),
}

/// A write transaction did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// The signer or node refused the transaction before it was mined.
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    /// The transaction was mined but failed on-chain.
    #[error("Transaction reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Reverted { reason: Option<String> },
    /// No confirmation arrived within the configured bound.
    #[error("Timed out after {0:?} waiting for confirmation")]
    Timeout(Duration),
    /// The first step of a two-step write failed; the second was not sent.
    #[error("{step} failed, sequence aborted: {source}")]
    SequenceAborted {
        step: String,
        #[source]
        source: Box<WriteError>,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

/// Configuration could not be loaded or is incomplete.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid account id for {field}: {value}")]
    InvalidAccountId { field: &'static str, value: String },
    #[error("Invalid RPC url: {0}")]
    InvalidRpcUrl(String),
}

/// The local referral cache could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache file is corrupt: {0}")]
    Corrupt(String),
}
