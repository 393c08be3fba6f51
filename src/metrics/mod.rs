//! Cache Metrics System
//!
//! Two views of the same counters:
//!
//! - [`CacheStats`]: the compact snapshot returned by
//!   [`UnifiedCache::stats`](crate::UnifiedCache::stats) (strategy, entry and
//!   memory usage, absolute and relative hit rates).
//! - [`CacheMetrics`]: a `BTreeMap<String, f64>` report with lifetime
//!   counters for comparing runs.
//!
//! # Why BTreeMap over HashMap?
//!
//! Metrics always come out in the same key order, which keeps logs and
//! test comparisons reproducible. With a dozen keys the O(log n) lookups do
//! not matter.

pub mod hit_rate;

pub use hit_rate::HitCounters;

use crate::config::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time cache statistics.
///
/// Serializes with camelCase field names:
///
/// ```
/// use unified_cache::UnifiedCache;
///
/// let cache: UnifiedCache<String, String> = UnifiedCache::new(10, 100).unwrap();
/// let json = serde_json::to_value(cache.stats()).unwrap();
/// assert_eq!(json["strategy"], "LRU");
/// assert_eq!(json["maxNodes"], 10);
/// assert_eq!(json["absHitRate"], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Active eviction strategy.
    pub strategy: Strategy,
    /// Entries currently stored.
    pub current_nodes: usize,
    /// Entry limit.
    pub max_nodes: usize,
    /// Sum of approximate entry sizes in bytes.
    pub current_memory: u64,
    /// Approximate memory limit in bytes.
    pub max_memory: u64,
    /// Hit rate since the last clear, two decimals.
    pub abs_hit_rate: f64,
    /// Hit rate in the current rolling window, two decimals.
    pub rel_hit_rate: f64,
}

/// Lifetime counters of a cache, reset by clear.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Entries created by `set` on a new key.
    pub insertions: u64,
    /// `set` calls that replaced an existing key.
    pub updates: u64,
    /// Entries evicted to satisfy a limit.
    pub evictions: u64,
    /// Entries removed by `remove_by_meta`.
    pub meta_removals: u64,
    /// Bytes written by `set` (new and replaced values).
    pub bytes_written: u64,
    /// Bytes released by eviction.
    pub bytes_evicted: u64,
}

impl CoreCacheMetrics {
    /// Records a new entry of `size` bytes.
    pub fn record_insertion(&mut self, size: u64) {
        self.insertions += 1;
        self.bytes_written += size;
    }

    /// Records an in-place replacement with a value of `size` bytes.
    pub fn record_update(&mut self, size: u64) {
        self.updates += 1;
        self.bytes_written += size;
    }

    /// Records a limit-driven eviction of `size` bytes.
    pub fn record_eviction(&mut self, size: u64) {
        self.evictions += 1;
        self.bytes_evicted += size;
    }

    /// Records `count` predicate removals.
    pub fn record_meta_removals(&mut self, count: usize) {
        self.meta_removals += count as u64;
    }
}

/// Trait for uniform metrics reporting.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Name of the active eviction algorithm ("LRU" or "LFU").
    fn algorithm_name(&self) -> &'static str;
}

/// Assembles the metrics report from the cache's counters.
pub(crate) fn to_btreemap(
    core: &CoreCacheMetrics,
    hits: &HitCounters,
    stats: &CacheStats,
) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();

    // Lookups
    metrics.insert("requests".to_string(), hits.requests() as f64);
    metrics.insert("cache_hits".to_string(), hits.hits() as f64);
    metrics.insert(
        "cache_misses".to_string(),
        (hits.requests() - hits.hits()) as f64,
    );
    metrics.insert("hit_rate".to_string(), stats.abs_hit_rate);
    metrics.insert("window_hit_rate".to_string(), stats.rel_hit_rate);
    metrics.insert("window_requests".to_string(), hits.window_requests() as f64);

    // Writes and removals
    metrics.insert("insertions".to_string(), core.insertions as f64);
    metrics.insert("updates".to_string(), core.updates as f64);
    metrics.insert("evictions".to_string(), core.evictions as f64);
    metrics.insert("meta_removals".to_string(), core.meta_removals as f64);
    metrics.insert("bytes_written".to_string(), core.bytes_written as f64);
    metrics.insert("bytes_evicted".to_string(), core.bytes_evicted as f64);

    // Occupancy
    metrics.insert("entries".to_string(), stats.current_nodes as f64);
    metrics.insert("max_entries".to_string(), stats.max_nodes as f64);
    metrics.insert("memory_bytes".to_string(), stats.current_memory as f64);
    metrics.insert("max_memory_bytes".to_string(), stats.max_memory as f64);
    metrics.insert(
        "memory_utilization".to_string(),
        stats.current_memory as f64 / stats.max_memory as f64,
    );

    metrics
}
