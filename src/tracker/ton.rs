//! TON access through the toncenter v2 HTTP API.

use serde::Deserialize;
use serde_json::Value;

use crate::config::{TonConfig, TrackersConfig};
use crate::tracker::client::TrackerCore;
use crate::tracker::types::{
    parse_raw_amount, scale_amount, Balance, Chain, Direction, Transaction, TrackerError, TxStatus,
};

/// 1 TON = 10^9 nanoton.
const NANOTON_DECIMALS: u32 = 9;

/// User-friendly form: `EQ`/`UQ` followed by 46 base64url characters.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 48
        && (address.starts_with("EQ") || address.starts_with("UQ"))
        && address[2..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl Envelope {
    fn into_result(self) -> Result<Value, TrackerError> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(TrackerError::Api(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    utime: i64,
    transaction_id: TransactionId,
    #[serde(default)]
    in_msg: Option<RawMessage>,
    #[serde(default)]
    out_msgs: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct TransactionId {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    source: String,
    #[serde(default)]
    destination: String,
    #[serde(default)]
    value: String,
}

impl RawMessage {
    /// Value in nanoton, if the message moved any funds.
    fn nanoton(&self) -> Option<u128> {
        self.value.parse::<u128>().ok().filter(|v| *v > 0)
    }
}

pub struct TonTracker {
    base_url: String,
    explorer_url: String,
    api_key: Option<String>,
    core: TrackerCore,
}

impl TonTracker {
    pub fn new(config: &TonConfig, settings: &TrackersConfig) -> Result<Self, TrackerError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            explorer_url: config.explorer_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            core: TrackerCore::new(Chain::Ton, settings)?,
        })
    }

    pub fn core(&self) -> &TrackerCore {
        &self.core
    }

    pub fn explorer_link(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    fn params(&self, address: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("address", address.to_string())];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    pub async fn fetch_balance(&self, address: &str) -> Result<Balance, TrackerError> {
        let url = format!("{}/getAddressBalance", self.base_url);
        let envelope: Envelope = self
            .core
            .get_json("balance", &url, &self.params(address))
            .await?;

        let raw = parse_raw_amount(&envelope.into_result()?)?;
        Ok(Balance {
            amount: scale_amount(raw, NANOTON_DECIMALS)?,
            currency: "TON".to_string(),
            raw,
        })
    }

    pub async fn fetch_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, TrackerError> {
        let url = format!("{}/getTransactions", self.base_url);
        let mut params = self.params(address);
        params.push(("limit", limit.to_string()));

        let envelope: Envelope = self.core.get_json("transactions", &url, &params).await?;
        let raw: Vec<RawTransaction> = serde_json::from_value(envelope.into_result()?)
            .map_err(|e| TrackerError::Malformed(e.to_string()))?;

        let mut transactions = Vec::new();
        for tx in raw {
            transactions.extend(expand(tx)?);
        }
        transactions.truncate(limit);
        Ok(transactions)
    }
}

/// Split one TON transaction into its value-carrying messages.
///
/// An incoming internal message becomes an incoming entry; every outgoing
/// message with value becomes an outgoing entry. All entries share the
/// transaction hash.
fn expand(tx: RawTransaction) -> Result<Vec<Transaction>, TrackerError> {
    let mut entries = Vec::new();
    let hash = tx.transaction_id.hash;

    if let Some(msg) = &tx.in_msg {
        if let Some(value) = msg.nanoton() {
            entries.push(Transaction {
                direction: Direction::Incoming,
                amount: scale_amount(value, NANOTON_DECIMALS)?,
                counterparty: non_empty(&msg.source),
                timestamp: tx.utime,
                hash: hash.clone(),
                status: TxStatus::Unknown,
            });
        }
    }

    for msg in &tx.out_msgs {
        if let Some(value) = msg.nanoton() {
            entries.push(Transaction {
                direction: Direction::Outgoing,
                amount: scale_amount(value, NANOTON_DECIMALS)?,
                counterparty: non_empty(&msg.destination),
                timestamp: tx.utime,
                hash: hash.clone(),
                status: TxStatus::Unknown,
            });
        }
    }

    Ok(entries)
}

fn non_empty(address: &str) -> String {
    if address.is_empty() {
        "unknown".to_string()
    } else {
        address.to_string()
    }
}

impl std::fmt::Debug for TonTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TonTracker")
            .field("base_url", &self.base_url)
            .finish()
    }
}
