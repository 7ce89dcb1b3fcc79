//! Ethereum and BSC access through the Etherscan v2 multichain gateway.
//!
//! Both networks share the same envelope (`status`/`message`/`result`) and
//! wei-denominated amounts; they differ only in `chainid`, currency symbol
//! and explorer host.

use serde::Deserialize;
use serde_json::Value;

use crate::config::{EtherscanConfig, TrackersConfig};
use crate::tracker::client::TrackerCore;
use crate::tracker::types::{
    parse_raw_amount, scale_amount, Balance, Chain, Direction, Transaction, TrackerError, TxStatus,
};

/// 1 ETH / 1 BNB = 10^18 wei.
const WEI_DECIMALS: u32 = 18;

/// `status: "0"` carries this message for an address with no history.
const NO_TRANSACTIONS: &str = "No transactions found";

/// Network-specific constants for an Etherscan-served chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmNetwork {
    Ethereum,
    BinanceSmartChain,
}

impl EvmNetwork {
    fn chain(self) -> Chain {
        match self {
            EvmNetwork::Ethereum => Chain::Eth,
            EvmNetwork::BinanceSmartChain => Chain::Bsc,
        }
    }

    fn default_chain_id(self) -> u64 {
        match self {
            EvmNetwork::Ethereum => 1,
            EvmNetwork::BinanceSmartChain => 56,
        }
    }

    fn currency(self) -> &'static str {
        match self {
            EvmNetwork::Ethereum => "ETH",
            EvmNetwork::BinanceSmartChain => "BNB",
        }
    }

    fn default_explorer(self) -> &'static str {
        match self {
            EvmNetwork::Ethereum => "https://etherscan.io",
            EvmNetwork::BinanceSmartChain => "https://bscscan.com",
        }
    }
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

impl Envelope {
    /// Error text for a failed call; Etherscan puts the detail in `result`.
    fn error_text(&self) -> String {
        match &self.result {
            Value::String(detail) if !detail.is_empty() => format!("{}: {}", self.message, detail),
            _ => self.message.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TxRecord {
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    value: String,
    #[serde(rename = "timeStamp", default)]
    time_stamp: String,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    txreceipt_status: String,
    #[serde(rename = "isError", default)]
    is_error: String,
}

pub struct EtherscanTracker {
    network: EvmNetwork,
    base_url: String,
    chain_id: u64,
    api_key: Option<String>,
    explorer_url: String,
    core: TrackerCore,
}

impl EtherscanTracker {
    pub fn new(
        network: EvmNetwork,
        config: &EtherscanConfig,
        settings: &TrackersConfig,
    ) -> Result<Self, TrackerError> {
        let explorer_url = config
            .explorer_url
            .clone()
            .unwrap_or_else(|| network.default_explorer().to_string());

        Ok(Self {
            network,
            base_url: config.base_url.clone(),
            chain_id: config.chain_id.unwrap_or_else(|| network.default_chain_id()),
            api_key: config.api_key.clone(),
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
            core: TrackerCore::new(network.chain(), settings)?,
        })
    }

    pub fn core(&self) -> &TrackerCore {
        &self.core
    }

    pub fn explorer_link(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    fn params(&self, action: &str, address: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("chainid", self.chain_id.to_string()),
            ("module", "account".to_string()),
            ("action", action.to_string()),
            ("address", address.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }

    pub async fn fetch_balance(&self, address: &str) -> Result<Balance, TrackerError> {
        let mut params = self.params("balance", address);
        params.push(("tag", "latest".to_string()));

        let envelope: Envelope = self.core.get_json("balance", &self.base_url, &params).await?;
        if envelope.status != "1" {
            return Err(TrackerError::Api(envelope.error_text()));
        }

        let raw = parse_raw_amount(&envelope.result)?;
        Ok(Balance {
            amount: scale_amount(raw, WEI_DECIMALS)?,
            currency: self.network.currency().to_string(),
            raw,
        })
    }

    pub async fn fetch_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, TrackerError> {
        let mut params = self.params("txlist", address);
        params.extend([
            ("startblock", "0".to_string()),
            ("endblock", "99999999".to_string()),
            ("page", "1".to_string()),
            ("offset", limit.to_string()),
            ("sort", "desc".to_string()),
        ]);

        let envelope: Envelope = self.core.get_json("txlist", &self.base_url, &params).await?;
        if envelope.status != "1" {
            if envelope.message == NO_TRANSACTIONS {
                return Ok(Vec::new());
            }
            return Err(TrackerError::Api(envelope.error_text()));
        }

        let records: Vec<TxRecord> = serde_json::from_value(envelope.result)
            .map_err(|e| TrackerError::Malformed(e.to_string()))?;

        let mut transactions = records
            .into_iter()
            .map(|record| normalize(record, address))
            .collect::<Result<Vec<_>, _>>()?;
        transactions.truncate(limit);
        Ok(transactions)
    }
}

fn normalize(record: TxRecord, address: &str) -> Result<Transaction, TrackerError> {
    let raw = parse_raw_amount(&Value::String(record.value))?;
    let incoming = record.to.eq_ignore_ascii_case(address);
    let counterparty = if incoming { record.from } else { record.to };

    let status = if record.is_error == "1" {
        TxStatus::Failed
    } else {
        match record.txreceipt_status.as_str() {
            "1" => TxStatus::Success,
            "0" => TxStatus::Failed,
            // Pre-Byzantium transactions carry no receipt status.
            _ => TxStatus::Unknown,
        }
    };

    Ok(Transaction {
        direction: if incoming {
            Direction::Incoming
        } else {
            Direction::Outgoing
        },
        amount: scale_amount(raw, WEI_DECIMALS)?,
        counterparty: if counterparty.is_empty() {
            "contract creation".to_string()
        } else {
            counterparty
        },
        timestamp: record.time_stamp.parse().unwrap_or_default(),
        hash: record.hash,
        status,
    })
}

impl std::fmt::Debug for EtherscanTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtherscanTracker")
            .field("network", &self.network)
            .field("base_url", &self.base_url)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
