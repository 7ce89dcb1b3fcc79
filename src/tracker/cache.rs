//! Short-lived memoization of chain lookups.

use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::observability::metrics;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// A thread-safe map whose entries expire `ttl` after they were written.
///
/// Expired entries are evicted lazily on the next `get` for the same key;
/// there is no background sweep.
pub struct TtlCache<K, V> {
    /// Label for cache metrics.
    name: &'static str,
    ttl: Duration,
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Return the cached value if it is no older than the TTL.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) <= self.ttl => {
                metrics::record_cache_lookup(self.name, true);
                return Some(entry.value.clone());
            }
            Some(_) => {}
            None => {
                metrics::record_cache_lookup(self.name, false);
                return None;
            }
        }

        // The read guard is released above; re-check under the write lock in
        // case a concurrent `set` refreshed the entry in between.
        self.entries
            .remove_if(key, |_, entry| now.duration_since(entry.stored_at) > self.ttl);
        metrics::record_cache_lookup(self.name, false);
        None
    }

    /// Store `value`, replacing any previous entry and restarting its TTL.
    pub fn set(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
