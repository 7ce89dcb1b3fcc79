//! Explicitly constructed application state shared by the API and the monitor.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::{MonitorConfig, TrackersConfig};
use crate::notify::render::format_wallet_info;
use crate::notify::NotificationSink;
use crate::tracker::{detect_chains, Balance, Chain, InvalidAddress, TrackerError, TrackerSet, Transaction};
use crate::watch::{WalletMonitor, WalletRegistry};

/// Recent transactions fetched for an interactive lookup.
pub const LOOKUP_TRANSACTIONS: usize = 5;

/// Why an address could not be pinned to one chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("'{0}' is not a TON, Ethereum or BSC address")]
    Unrecognized(String),

    #[error("'{address}' is valid on several chains ({}); specify one", join(.candidates))]
    Ambiguous { address: String, candidates: Vec<Chain> },

    #[error(transparent)]
    Invalid(#[from] InvalidAddress),
}

fn join(chains: &[Chain]) -> String {
    chains.iter().map(Chain::as_str).collect::<Vec<_>>().join(", ")
}

/// Answer to an interactive wallet lookup.
#[derive(Debug, Clone, Serialize)]
pub struct WalletInfo {
    pub address: String,
    pub chain: Chain,
    /// `None` when the balance could not be determined.
    pub balance: Option<Balance>,
    pub transactions: Vec<Transaction>,
    pub explorer_link: String,
    /// HTML message ready for a chat client.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct WatchService {
    trackers: Arc<TrackerSet>,
    registry: Arc<WalletRegistry>,
}

impl WatchService {
    pub fn new(trackers: Arc<TrackerSet>) -> Self {
        let registry = Arc::new(WalletRegistry::new(trackers.clone()));
        Self { trackers, registry }
    }

    pub fn from_config(config: &TrackersConfig) -> Result<Self, TrackerError> {
        Ok(Self::new(Arc::new(TrackerSet::from_config(config)?)))
    }

    pub fn trackers(&self) -> &Arc<TrackerSet> {
        &self.trackers
    }

    pub fn registry(&self) -> &Arc<WalletRegistry> {
        &self.registry
    }

    /// Pick the chain for `address`, checking it against `requested` if given.
    pub fn resolve_chain(&self, address: &str, requested: Option<Chain>) -> Result<Chain, ResolveError> {
        if let Some(chain) = requested {
            self.trackers.get(chain).check_address(address)?;
            return Ok(chain);
        }

        let mut candidates = detect_chains(address);
        match candidates.len() {
            0 => Err(ResolveError::Unrecognized(address.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => Err(ResolveError::Ambiguous {
                address: address.to_string(),
                candidates,
            }),
        }
    }

    /// Balance, recent transactions and explorer link for `address`.
    ///
    /// Uses the caches. The address is validated before any network call.
    pub async fn lookup(&self, address: &str, chain: Chain) -> Result<WalletInfo, InvalidAddress> {
        let tracker = self.trackers.get(chain);
        tracker.check_address(address)?;

        let balance = tracker.balance(address, true).await;
        let transactions = tracker.transactions(address, LOOKUP_TRANSACTIONS, true).await;
        let explorer_link = tracker.explorer_link(address);
        let text = format_wallet_info(
            address,
            chain,
            balance.as_ref(),
            &transactions,
            &explorer_link,
        );

        Ok(WalletInfo {
            address: address.to_string(),
            chain,
            balance,
            transactions,
            explorer_link,
            text,
        })
    }

    /// Background monitor over this service's registry and trackers.
    pub fn monitor(&self, config: MonitorConfig, sink: Arc<dyn NotificationSink>) -> WalletMonitor {
        WalletMonitor::new(self.registry.clone(), self.trackers.clone(), sink, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::tests::offline_set;

    const TON_ADDR: &str = "EQD1Lp1KcmGHFpE8eIvL1mnHT83b4HdB8HJxuSfq6Rq4zGyN";
    const EVM_ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb1";

    fn service() -> WatchService {
        WatchService::new(Arc::new(offline_set()))
    }

    #[test]
    fn test_resolve_chain() {
        let service = service();
        assert_eq!(service.resolve_chain(TON_ADDR, None), Ok(Chain::Ton));
        assert_eq!(service.resolve_chain(EVM_ADDR, Some(Chain::Bsc)), Ok(Chain::Bsc));
        assert!(matches!(
            service.resolve_chain(EVM_ADDR, None),
            Err(ResolveError::Ambiguous { candidates, .. }) if candidates == vec![Chain::Eth, Chain::Bsc]
        ));
        assert!(matches!(
            service.resolve_chain("garbage", None),
            Err(ResolveError::Unrecognized(_))
        ));
        assert!(matches!(
            service.resolve_chain(TON_ADDR, Some(Chain::Eth)),
            Err(ResolveError::Invalid(_))
        ));
    }

    #[test]
    fn test_ambiguous_message_lists_chains() {
        let err = service().resolve_chain(EVM_ADDR, None).unwrap_err();
        assert!(err.to_string().contains("ETH, BSC"));
    }

    #[tokio::test]
    async fn test_lookup_with_unreachable_api() {
        let info = service().lookup(TON_ADDR, Chain::Ton).await.unwrap();
        assert!(info.balance.is_none());
        assert!(info.transactions.is_empty());
        assert!(info.text.contains("unavailable"));
        assert_eq!(info.explorer_link, format!("https://tonscan.org/address/{TON_ADDR}"));
    }

    #[tokio::test]
    async fn test_lookup_rejects_wrong_chain() {
        let err = service().lookup(TON_ADDR, Chain::Bsc).await.unwrap_err();
        assert_eq!(err.chain, Chain::Bsc);
    }
}
