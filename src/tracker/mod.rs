//! Chain API access subsystem.
//!
//! # Data Flow
//! ```text
//! interactive lookup / registry seed / monitor tick
//!     → ChainTracker (address check, cache lookup)
//!     → ton.rs | etherscan.rs (request building, envelope mapping)
//!     → client.rs (rate limit → HTTP GET with timeout → JSON decode)
//!     → Balance / Vec<Transaction> (or None / empty on any failure)
//! ```
//!
//! # Design Decisions
//! - `ChainTracker` is a closed enum: exactly TON, ETH and BSC
//! - Scale factors and response field names live in the variant modules only
//! - Transport and provider errors are logged here and never surface to callers
//! - One rate limiter and one pair of caches per chain, shared by interactive
//!   and background callers

pub mod cache;
pub mod client;
pub mod etherscan;
pub mod rate_limit;
pub mod ton;
pub mod types;

use crate::config::TrackersConfig;

pub use etherscan::{EtherscanTracker, EvmNetwork};
pub use ton::TonTracker;
pub use types::{
    Balance, Chain, Direction, InvalidAddress, TrackerError, Transaction, TxStatus, UnknownChain,
};

use client::TrackerCore;

/// Access to one chain's explorer API.
#[derive(Debug)]
pub enum ChainTracker {
    Ton(TonTracker),
    Eth(EtherscanTracker),
    Bsc(EtherscanTracker),
}

impl ChainTracker {
    pub fn chain(&self) -> Chain {
        match self {
            ChainTracker::Ton(_) => Chain::Ton,
            ChainTracker::Eth(_) => Chain::Eth,
            ChainTracker::Bsc(_) => Chain::Bsc,
        }
    }

    fn core(&self) -> &TrackerCore {
        match self {
            ChainTracker::Ton(t) => t.core(),
            ChainTracker::Eth(t) | ChainTracker::Bsc(t) => t.core(),
        }
    }

    /// Format-only address check; never touches the network.
    pub fn validate_address(&self, address: &str) -> bool {
        match self {
            ChainTracker::Ton(_) => ton::is_valid_address(address),
            ChainTracker::Eth(_) | ChainTracker::Bsc(_) => etherscan::is_valid_address(address),
        }
    }

    pub fn check_address(&self, address: &str) -> Result<(), InvalidAddress> {
        if self.validate_address(address) {
            Ok(())
        } else {
            Err(InvalidAddress {
                chain: self.chain(),
                address: address.to_string(),
            })
        }
    }

    pub fn explorer_link(&self, address: &str) -> String {
        match self {
            ChainTracker::Ton(t) => t.explorer_link(address),
            ChainTracker::Eth(t) | ChainTracker::Bsc(t) => t.explorer_link(address),
        }
    }

    /// Current native balance, or `None` when it could not be determined.
    ///
    /// `None` means "unknown", never zero.
    pub async fn balance(&self, address: &str, use_cache: bool) -> Option<Balance> {
        if !self.validate_address(address) {
            tracing::warn!(chain = %self.chain(), address, "Refusing balance lookup for malformed address");
            return None;
        }

        let core = self.core();
        let key = format!("balance:{address}");
        if use_cache {
            if let Some(hit) = core.balances.get(&key) {
                return Some(hit);
            }
        }

        let result = match self {
            ChainTracker::Ton(t) => t.fetch_balance(address).await,
            ChainTracker::Eth(t) | ChainTracker::Bsc(t) => t.fetch_balance(address).await,
        };

        match result {
            Ok(balance) => {
                core.balances.set(key, balance.clone());
                Some(balance)
            }
            Err(e) => {
                tracing::warn!(chain = %self.chain(), address, error = %e, "Balance lookup failed");
                None
            }
        }
    }

    /// Up to `limit` most recent transactions, newest first.
    ///
    /// Any failure yields an empty page.
    pub async fn transactions(&self, address: &str, limit: usize, use_cache: bool) -> Vec<Transaction> {
        if !self.validate_address(address) {
            tracing::warn!(chain = %self.chain(), address, "Refusing transaction lookup for malformed address");
            return Vec::new();
        }
        if limit == 0 {
            return Vec::new();
        }

        let core = self.core();
        let key = format!("tx:{address}:{limit}");
        if use_cache {
            if let Some(hit) = core.transactions.get(&key) {
                return hit;
            }
        }

        let result = match self {
            ChainTracker::Ton(t) => t.fetch_transactions(address, limit).await,
            ChainTracker::Eth(t) | ChainTracker::Bsc(t) => t.fetch_transactions(address, limit).await,
        };

        match result {
            Ok(transactions) => {
                core.transactions.set(key, transactions.clone());
                transactions
            }
            Err(e) => {
                tracing::warn!(chain = %self.chain(), address, error = %e, "Transaction lookup failed");
                Vec::new()
            }
        }
    }
}

/// One tracker per supported chain.
#[derive(Debug)]
pub struct TrackerSet {
    ton: ChainTracker,
    eth: ChainTracker,
    bsc: ChainTracker,
}

impl TrackerSet {
    pub fn from_config(config: &TrackersConfig) -> Result<Self, TrackerError> {
        let set = Self {
            ton: ChainTracker::Ton(TonTracker::new(&config.ton, config)?),
            eth: ChainTracker::Eth(EtherscanTracker::new(
                EvmNetwork::Ethereum,
                &config.ethereum,
                config,
            )?),
            bsc: ChainTracker::Bsc(EtherscanTracker::new(
                EvmNetwork::BinanceSmartChain,
                &config.bsc,
                config,
            )?),
        };

        tracing::info!(
            cache_ttl_secs = config.cache_ttl_secs,
            rate_limit_min_interval_ms = config.rate_limit_min_interval_ms,
            "Chain trackers initialized"
        );
        Ok(set)
    }

    pub fn get(&self, chain: Chain) -> &ChainTracker {
        match chain {
            Chain::Ton => &self.ton,
            Chain::Eth => &self.eth,
            Chain::Bsc => &self.bsc,
        }
    }
}

/// Chains whose address format matches `address`.
///
/// EVM-format addresses are valid on both Ethereum and BSC, so the result
/// has two entries for them and callers must ask which one is meant.
pub fn detect_chains(address: &str) -> Vec<Chain> {
    let address = address.trim();
    if ton::is_valid_address(address) {
        vec![Chain::Ton]
    } else if etherscan::is_valid_address(address) {
        vec![Chain::Eth, Chain::Bsc]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const TON_ADDR: &str = "EQD1Lp1KcmGHFpE8eIvL1mnHT83b4HdB8HJxuSfq6Rq4zGyN";
    const EVM_ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb1";

    /// Trackers whose endpoints refuse connections.
    pub(crate) fn offline_set() -> TrackerSet {
        let mut config = TrackersConfig::default();
        config.rate_limit_min_interval_ms = 0;
        config.ton.base_url = "http://127.0.0.1:9".to_string();
        config.ethereum.base_url = "http://127.0.0.1:9".to_string();
        config.bsc.base_url = "http://127.0.0.1:9".to_string();
        TrackerSet::from_config(&config).unwrap()
    }

    #[test]
    fn test_detect_chains() {
        assert_eq!(detect_chains(TON_ADDR), vec![Chain::Ton]);
        assert_eq!(detect_chains(EVM_ADDR), vec![Chain::Eth, Chain::Bsc]);
        assert!(detect_chains("hello").is_empty());
    }

    #[test]
    fn test_validation_is_per_chain() {
        let set = offline_set();
        assert!(set.get(Chain::Ton).validate_address(TON_ADDR));
        assert!(!set.get(Chain::Ton).validate_address(EVM_ADDR));
        assert!(set.get(Chain::Eth).validate_address(EVM_ADDR));
        assert!(set.get(Chain::Bsc).validate_address(EVM_ADDR));
        assert!(!set.get(Chain::Bsc).validate_address(TON_ADDR));
        let err = set.get(Chain::Eth).check_address("0x12").unwrap_err();
        assert_eq!(err.chain, Chain::Eth);
    }

    #[test]
    fn test_explorer_links() {
        let set = offline_set();
        assert_eq!(
            set.get(Chain::Ton).explorer_link(TON_ADDR),
            format!("https://tonscan.org/address/{TON_ADDR}")
        );
        assert_eq!(
            set.get(Chain::Eth).explorer_link(EVM_ADDR),
            format!("https://etherscan.io/address/{EVM_ADDR}")
        );
    }

    #[tokio::test]
    async fn test_malformed_address_short_circuits() {
        let set = offline_set();
        let tracker = set.get(Chain::Eth);
        assert!(tracker.balance("not-an-address", false).await.is_none());
        assert!(tracker.transactions("not-an-address", 5, false).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_api_yields_absent_results() {
        let set = offline_set();
        let tracker = set.get(Chain::Ton);
        assert!(tracker.balance(TON_ADDR, false).await.is_none());
        assert!(tracker.transactions(TON_ADDR, 5, false).await.is_empty());
    }
}
