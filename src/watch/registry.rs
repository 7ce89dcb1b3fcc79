//! Per-chat registry of tracked wallets.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::observability::metrics;
use crate::tracker::{Chain, InvalidAddress, TrackerSet};
use crate::watch::types::{ChatId, TrackedWallet};

/// Tracked wallets grouped by chat.
///
/// One lock guards the whole map. It is only held for map reads and writes,
/// never across a chain API call.
pub struct WalletRegistry {
    trackers: Arc<TrackerSet>,
    wallets: Mutex<BTreeMap<ChatId, Vec<TrackedWallet>>>,
}

impl WalletRegistry {
    pub fn new(trackers: Arc<TrackerSet>) -> Self {
        Self {
            trackers,
            wallets: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ChatId, Vec<TrackedWallet>>> {
        // Every critical section leaves the map consistent, so a panic in
        // another holder does not invalidate it.
        self.wallets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking `address` on `chain` for `chat_id`.
    ///
    /// Returns `Ok(false)` if the chat already tracks this wallet. On success
    /// the cursor is seeded from one uncached fetch; if that fetch yields
    /// nothing the wallet stays registered with an unset cursor.
    pub async fn add(
        &self,
        chat_id: ChatId,
        address: &str,
        chain: Chain,
    ) -> Result<bool, InvalidAddress> {
        let tracker = self.trackers.get(chain);
        tracker.check_address(address)?;

        let total = {
            let mut wallets = self.lock();
            let entries = wallets.entry(chat_id).or_default();
            if entries.iter().any(|w| w.is(chat_id, address, chain)) {
                return Ok(false);
            }
            entries.push(TrackedWallet::new(chat_id, address, chain));
            wallets.values().map(Vec::len).sum::<usize>()
        };
        metrics::record_tracked_wallets(total);
        tracing::info!(chat_id, address, chain = %chain, "Wallet tracked");

        let seed = tracker.transactions(address, 1, false).await;
        match seed.into_iter().next() {
            Some(newest) => {
                if self.seed_cursor(chat_id, address, chain, newest.hash) {
                    tracing::debug!(chat_id, address, chain = %chain, "Cursor seeded");
                }
            }
            None => {
                tracing::info!(
                    chat_id,
                    address,
                    chain = %chain,
                    "No transaction to seed cursor; first poll will adopt one"
                );
            }
        }

        Ok(true)
    }

    /// Set the cursor if the wallet still exists and has none yet.
    fn seed_cursor(&self, chat_id: ChatId, address: &str, chain: Chain, hash: String) -> bool {
        let mut wallets = self.lock();
        let Some(wallet) = wallets
            .get_mut(&chat_id)
            .and_then(|entries| entries.iter_mut().find(|w| w.is(chat_id, address, chain)))
        else {
            return false;
        };
        if wallet.last_seen_hash.is_some() {
            return false;
        }
        wallet.last_seen_hash = Some(hash);
        true
    }

    /// Stop tracking `address` for `chat_id` on every chain.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove(&self, chat_id: ChatId, address: &str) -> bool {
        let (removed, total) = {
            let mut wallets = self.lock();
            let Some(entries) = wallets.get_mut(&chat_id) else {
                return false;
            };
            let before = entries.len();
            entries.retain(|w| !w.has_address(address));
            let removed = before - entries.len();
            if entries.is_empty() {
                wallets.remove(&chat_id);
            }
            (removed, wallets.values().map(Vec::len).sum::<usize>())
        };

        if removed > 0 {
            metrics::record_tracked_wallets(total);
            tracing::info!(chat_id, address, removed, "Wallet untracked");
        }
        removed > 0
    }

    /// Copy of the wallets tracked by `chat_id`.
    pub fn list(&self, chat_id: ChatId) -> Vec<TrackedWallet> {
        self.lock().get(&chat_id).cloned().unwrap_or_default()
    }

    /// Copy of every tracked wallet, ordered by chat.
    pub fn snapshot(&self) -> Vec<TrackedWallet> {
        self.lock().values().flatten().cloned().collect()
    }

    /// Move `observed`'s cursor to `new_hash`.
    ///
    /// Applies only if the wallet is still tracked and its cursor still equals
    /// `observed.last_seen_hash`, so a stale snapshot can never move a cursor
    /// backwards or resurrect a removed wallet.
    pub fn advance_cursor(&self, observed: &TrackedWallet, new_hash: String) -> bool {
        let mut wallets = self.lock();
        let current = wallets.get_mut(&observed.chat_id).and_then(|entries| {
            entries
                .iter_mut()
                .find(|w| w.is(observed.chat_id, &observed.address, observed.chain))
        });

        match current {
            Some(wallet) if wallet.last_seen_hash == observed.last_seen_hash => {
                wallet.last_seen_hash = Some(new_hash);
                true
            }
            _ => false,
        }
    }

    /// Total tracked wallets across all chats.
    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRegistry")
            .field("tracked", &self.len())
            .finish()
    }
}
