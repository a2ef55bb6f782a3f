//! Bounded LRU cache for finished request results
//!
//! Shared by the glob layer (small cache, whole result collections) and
//! the signature layer (large cache, one entry per object name). A
//! poisoned lock degrades to cache misses rather than panicking; the
//! cache is an accelerator, never a source of truth.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use lru::LruCache;
use serde::Serialize;

/// Hit/miss counters and occupancy for one cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, 0.0 when never queried.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// How full the cache is, in [0.0, 1.0].
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.entries as f64 / self.capacity as f64
    }
}

pub struct ResultCache<K: Hash + Eq, V: Clone> {
    entries: RwLock<LruCache<K, V>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> ResultCache<K, V> {
    /// New cache holding at most `capacity` entries (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up `key`, refreshing its recency on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.entries.write().ok()?.get(key).cloned();
        match value {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace `key`, evicting the least-recently-used entry
    /// when full.
    pub fn insert(&self, key: K, value: V) {
        if let Ok(mut entries) = self.entries.write() {
            entries.put(key, value);
        }
    }

    /// Drop `key` if present. Returns whether an entry was removed.
    pub fn remove(&self, key: &K) -> bool {
        match self.entries.write() {
            Ok(mut entries) => entries.pop(key).is_some(),
            Err(_) => false,
        }
    }

    /// Drop every entry whose key matches `pred`. Returns how many were
    /// removed.
    pub fn remove_matching(&self, pred: impl Fn(&K) -> bool) -> usize
    where
        K: Clone,
    {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let doomed: Vec<K> = entries
            .iter()
            .filter(|(key, _)| pred(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        doomed.len()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.capacity,
        }
    }
}
