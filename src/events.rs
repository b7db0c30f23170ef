//! # Client Events
//!
//! Structured diagnostic events, logged as JSON lines prefixed with
//! `EVENT_JSON:` through `tracing`.
//!
//! ## Event Types
//!
//! - `DecimalsUnresolved`: a token's decimals could not be read; default used
//! - `ReadUnavailable`: a contract read failed; a zero default was substituted
//! - `StaleFloorPrice`: the vault reported a zero floor price with positive backing
//! - `TxSubmitted` / `TxConfirmed` / `TxFailed`: write lifecycle
//!
//! ## Format
//!
//! ```json
//! {
//!   "standard": "limitless",
//!   "version": "1.0.0",
//!   "event": "stale_floor_price",
//!   "data": [{ ... }]
//! }
//! ```

use serde::Serialize;

/// Log target used for every event line.
pub const EVENT_TARGET: &str = "limitless_client::events";

// ============================================================================
// Event Wrapper
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(tag = "standard")]
#[must_use = "don't forget to `.emit()` this event"]
#[serde(rename_all = "snake_case")]
pub(crate) enum ClientEventLog<'a> {
    Limitless(LimitlessEvent<'a>),
}

impl ClientEventLog<'_> {
    fn to_json_string(&self) -> String {
        // Serializing plain structs of strings and numbers cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_json_event_string(&self) -> String {
        format!("EVENT_JSON:{}", self.to_json_string())
    }

    fn level(&self) -> EventLevel {
        let ClientEventLog::Limitless(event) = self;
        match event.event_kind {
            EventKind::ReadUnavailable(_) => EventLevel::Debug,
            EventKind::DecimalsUnresolved(_) | EventKind::StaleFloorPrice(_) => EventLevel::Warn,
            EventKind::TxFailed(_) => EventLevel::Warn,
            EventKind::TxSubmitted(_) | EventKind::TxConfirmed(_) => EventLevel::Info,
        }
    }

    pub(crate) fn emit(self) {
        let line = self.to_json_event_string();
        match self.level() {
            EventLevel::Debug => tracing::debug!(target: EVENT_TARGET, "{}", line),
            EventLevel::Info => tracing::info!(target: EVENT_TARGET, "{}", line),
            EventLevel::Warn => tracing::warn!(target: EVENT_TARGET, "{}", line),
        }
    }
}

enum EventLevel {
    Debug,
    Info,
    Warn,
}

// ============================================================================
// Read-side Events
// ============================================================================

/// A token's decimals could not be resolved and the default was used.
#[must_use]
#[derive(Serialize, Debug, Clone)]
pub struct DecimalsUnresolved<'a> {
    pub contract: &'a str,
    pub reason: &'a str,
    pub fallback: u8,
}

impl DecimalsUnresolved<'_> {
    pub fn emit(self) {
        new_v1(EventKind::DecimalsUnresolved(&[self])).emit()
    }
}

/// A contract read failed and a default value was substituted.
#[must_use]
#[derive(Serialize, Debug, Clone)]
pub struct ReadUnavailable<'a> {
    pub method: &'a str,
    pub reason: &'a str,
}

impl ReadUnavailable<'_> {
    pub fn emit(self) {
        new_v1(EventKind::ReadUnavailable(&[self])).emit()
    }
}

/// The vault reported a zero floor price while holding backing.
///
/// Indicates the contract-side division underflow; the client fell back to a
/// derived price.
#[must_use]
#[derive(Serialize, Debug, Clone)]
pub struct StaleFloorPrice<'a> {
    pub total_backing: String,
    pub fallback_source: &'a str,
    pub fallback_price: f64,
}

impl StaleFloorPrice<'_> {
    pub fn emit(self) {
        new_v1(EventKind::StaleFloorPrice(&[self])).emit()
    }
}

// ============================================================================
// Write-side Events
// ============================================================================

#[must_use]
#[derive(Serialize, Debug, Clone)]
pub struct TxSubmitted<'a> {
    pub action: &'a str,
    pub tx_hash: &'a str,
}

impl TxSubmitted<'_> {
    pub fn emit(self) {
        new_v1(EventKind::TxSubmitted(&[self])).emit()
    }
}

#[must_use]
#[derive(Serialize, Debug, Clone)]
pub struct TxConfirmed<'a> {
    pub action: &'a str,
    pub tx_hash: &'a str,
}

impl TxConfirmed<'_> {
    pub fn emit(self) {
        new_v1(EventKind::TxConfirmed(&[self])).emit()
    }
}

#[must_use]
#[derive(Serialize, Debug, Clone)]
pub struct TxFailed<'a> {
    pub action: &'a str,
    pub error: String,
}

impl TxFailed<'_> {
    pub fn emit(self) {
        new_v1(EventKind::TxFailed(&[self])).emit()
    }
}

// ============================================================================
// Internal Event Structures
// ============================================================================

#[derive(Serialize, Debug)]
pub(crate) struct LimitlessEvent<'a> {
    version: &'static str,
    #[serde(flatten)]
    event_kind: EventKind<'a>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
enum EventKind<'a> {
    DecimalsUnresolved(&'a [DecimalsUnresolved<'a>]),
    ReadUnavailable(&'a [ReadUnavailable<'a>]),
    StaleFloorPrice(&'a [StaleFloorPrice<'a>]),
    TxSubmitted(&'a [TxSubmitted<'a>]),
    TxConfirmed(&'a [TxConfirmed<'a>]),
    TxFailed(&'a [TxFailed<'a>]),
}

fn new_v1(event_kind: EventKind<'_>) -> ClientEventLog<'_> {
    ClientEventLog::Limitless(LimitlessEvent {
        version: "1.0.0",
        event_kind,
    })
}
