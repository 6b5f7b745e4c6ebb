//! Cache Store Module
//!
//! Main cache engine: per-namespace HashMap storage with insertion-order
//! eviction and age-based expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, InsertionOrder, Namespace, SystemClock};

// == Partition ==
/// Entries and insertion order for a single namespace.
#[derive(Debug)]
struct Partition<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: InsertionOrder,
}

impl<V> Default for Partition<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
        }
    }
}

impl<V> Partition<V> {
    /// Removes every entry older than `max_age_ms`, returning how many went.
    fn remove_expired(&mut self, now_ms: u64, max_age_ms: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now_ms, max_age_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.order.remove(key);
        }

        expired_keys.len()
    }
}

enum Lookup<V> {
    Absent,
    Fresh(V),
    Expired,
}

// == Cache Store ==
/// Namespaced cache with a per-namespace size bound and a maximum entry age.
///
/// Eviction is oldest-first by insertion, not by access. Expired entries are
/// removed lazily on `get` and in bulk by `sweep`.
#[derive(Debug)]
pub struct CacheStore<V> {
    partitions: HashMap<Namespace, Partition<V>>,
    stats: CacheStats,
    /// Maximum number of entries per namespace
    max_size: usize,
    /// Maximum entry age in milliseconds
    max_age_ms: u64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore backed by the system clock.
    ///
    /// # Arguments
    /// * `max_size` - Maximum entries per namespace (0 is treated as 1)
    /// * `max_age` - Entries older than this are never returned
    pub fn new(max_size: usize, max_age: Duration) -> Self {
        Self::with_clock(max_size, max_age, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(max_size: usize, max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        let partitions = Namespace::ALL
            .iter()
            .map(|ns| (*ns, Partition::default()))
            .collect();

        Self {
            partitions,
            stats: CacheStats::new(),
            max_size: max_size.max(1),
            max_age_ms: max_age.as_millis().min(u64::MAX as u128) as u64,
            clock,
        }
    }

    // == Put ==
    /// Stores `value` under `key` in `namespace`, stamped with the current time.
    ///
    /// Overwriting an existing key refreshes its timestamp but keeps its
    /// original eviction position. Inserting a new key into a full namespace
    /// first evicts the earliest inserted entry of that namespace.
    pub fn put(&mut self, namespace: Namespace, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now_ms();
        let max_size = self.max_size;
        let partition = self.partitions.entry(namespace).or_default();

        if let Some(entry) = partition.entries.get_mut(&key) {
            *entry = CacheEntry::new(value, now);
            return;
        }

        if partition.entries.len() >= max_size {
            if let Some(evicted_key) = partition.order.evict_oldest() {
                partition.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!(%namespace, key = %evicted_key, "evicted oldest entry");
            }
        }

        partition.order.record(&key);
        partition.entries.insert(key, CacheEntry::new(value, now));
        self.stats.set_entries(namespace, partition.entries.len());
    }

    // == Get ==
    /// Retrieves the value stored under `key`, if present and not expired.
    ///
    /// An expired entry is removed and reported as absent. Every call counts
    /// as exactly one hit or one miss.
    pub fn get(&mut self, namespace: Namespace, key: &str) -> Option<V> {
        match self.lookup(namespace, key) {
            Lookup::Fresh(value) => {
                self.stats.record_hit();
                Some(value)
            }
            Lookup::Absent | Lookup::Expired => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Like `get`, but leaves the hit and miss counters alone.
    ///
    /// For re-checking a key whose lookup was already counted. An expired
    /// entry is still removed and counted as an expiration.
    pub fn peek(&mut self, namespace: Namespace, key: &str) -> Option<V> {
        match self.lookup(namespace, key) {
            Lookup::Fresh(value) => Some(value),
            Lookup::Absent | Lookup::Expired => None,
        }
    }

    fn lookup(&mut self, namespace: Namespace, key: &str) -> Lookup<V> {
        let now = self.clock.now_ms();
        let max_age_ms = self.max_age_ms;
        let partition = self.partitions.entry(namespace).or_default();

        match partition.entries.get(key) {
            None => Lookup::Absent,
            Some(entry) if !entry.is_expired(now, max_age_ms) => Lookup::Fresh(entry.value.clone()),
            Some(_) => {
                partition.entries.remove(key);
                partition.order.remove(key);
                self.stats.record_expirations(1);
                self.stats.set_entries(namespace, partition.entries.len());
                debug!(%namespace, key, "expired entry removed on read");
                Lookup::Expired
            }
        }
    }

    // == Sweep ==
    /// Removes every expired entry in every namespace.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut removed = 0;

        for (namespace, partition) in self.partitions.iter_mut() {
            removed += partition.remove_expired(now, self.max_age_ms);
            self.stats.set_entries(*namespace, partition.entries.len());
        }

        self.stats.record_expirations(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        for (namespace, partition) in &self.partitions {
            stats.set_entries(*namespace, partition.entries.len());
        }
        stats
    }

    // == Length ==
    /// Returns the number of entries held in `namespace`, expired or not.
    pub fn len(&self, namespace: Namespace) -> usize {
        self.partitions
            .get(&namespace)
            .map_or(0, |partition| partition.entries.len())
    }

    /// Returns the number of entries across all namespaces.
    pub fn total_len(&self) -> usize {
        self.partitions.values().map(|p| p.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}
