//! Chain-neutral data shapes and error definitions.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chain {
    Ton,
    Eth,
    Bsc,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ton => "TON",
            Chain::Eth => "ETH",
            Chain::Bsc => "BSC",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ton" => Ok(Chain::Ton),
            "eth" | "ethereum" => Ok(Chain::Eth),
            "bsc" | "bnb" | "binance" => Ok(Chain::Bsc),
            _ => Err(UnknownChain(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown chain '{0}' (expected TON, ETH or BSC)")]
pub struct UnknownChain(pub String);

/// A native-currency balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Display amount in whole units.
    pub amount: Decimal,
    /// Currency symbol (e.g. "ETH", "BNB", "TON").
    pub currency: String,
    /// Amount in the chain's smallest unit.
    pub raw: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
    Unknown,
}

/// A normalized transaction as seen from the tracked address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub direction: Direction,
    /// Display amount in whole units of the native currency.
    pub amount: Decimal,
    /// Sender for incoming transfers, recipient for outgoing ones.
    pub counterparty: String,
    /// Unix timestamp (seconds).
    pub timestamp: i64,
    pub hash: String,
    pub status: TxStatus,
}

/// Errors raised while talking to a chain API.
///
/// These never escape a tracker's public operations; they are logged and
/// mapped to an absent balance or an empty transaction page.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Connection, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The provider answered but flagged the call as failed.
    #[error("API reported error: {0}")]
    Api(String),

    /// Body did not match the expected envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// An address that does not match the chain's format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{address}' is not a valid {chain} address")]
pub struct InvalidAddress {
    pub chain: Chain,
    pub address: String,
}

/// Convert an integer amount in base units to a display decimal.
pub(crate) fn scale_amount(raw: u128, decimals: u32) -> Result<Decimal, TrackerError> {
    i128::try_from(raw)
        .ok()
        .and_then(|raw| Decimal::try_from_i128_with_scale(raw, decimals).ok())
        .map(|d| d.normalize())
        .ok_or_else(|| TrackerError::Malformed(format!("amount {raw} out of range")))
}

/// Parse a base-unit amount that providers send either as a JSON string or
/// as a bare number.
pub(crate) fn parse_raw_amount(value: &serde_json::Value) -> Result<u128, TrackerError> {
    let parsed = match value {
        serde_json::Value::String(s) => s.trim().parse::<u128>().ok(),
        serde_json::Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    };
    parsed.ok_or_else(|| TrackerError::Malformed(format!("not an integer amount: {value}")))
}
