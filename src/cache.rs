//! Unified LRU/LFU Cache
//!
//! [`UnifiedCache`] is a key-value cache bounded by an entry count and by an
//! approximate memory budget, evicting by either recency (LRU) or access
//! frequency (LFU).
//!
//! # How It Works
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          UnifiedCache                             │
//! │                                                                   │
//! │  estimator ── size(value) ──┐                                     │
//! │                             ▼                                     │
//! │  ┌─────────────────── Mutex<CacheState> ───────────────────────┐  │
//! │  │                                                             │  │
//! │  │  NodeStore: key ─▶ NodeId ─▶ CacheNode{value,size,freq,..}  │  │
//! │  │                                   ▲                         │  │
//! │  │  Order (one of):                  │ prev/next ids           │  │
//! │  │    LRU  head ⇄ … ⇄ tail  (victim = tail)                    │  │
//! │  │    LFU  freq ─▶ bucket list (victim = oldest at min_freq)   │  │
//! │  │                                                             │  │
//! │  │  current_memory, HitCounters, CoreCacheMetrics              │  │
//! │  └─────────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every public operation, reads included, takes the one lock for its whole
//! duration, so all state transitions are totally ordered. Reads still need
//! the exclusive lock because a `get` reorders the LRU list or promotes the
//! LFU frequency.
//!
//! ## Eviction
//!
//! Only a `set` of a new key evicts, and it does so before inserting: while
//! the store is full or `current_memory + incoming > max_memory`, the
//! policy's victim is removed. Replacing an existing key adjusts memory
//! accounting but never evicts.
//!
//! A value whose estimated size alone exceeds `max_memory` empties the cache
//! and is then stored anyway; a warning is logged.
//!
//! # Example
//!
//! ```
//! use unified_cache::config::{Strategy, UnifiedCacheConfig};
//! use unified_cache::UnifiedCache;
//!
//! let config = UnifiedCacheConfig::try_new(3, 1024 * 1024)
//!     .unwrap()
//!     .with_strategy(Strategy::Lru);
//! let cache: UnifiedCache<String, String> = UnifiedCache::init(config, Default::default());
//!
//! for k in ["k1", "k2", "k3"] {
//!     cache.set(k.to_string(), format!("v-{k}")).unwrap();
//! }
//! cache.get("k1"); // k1 is now most recently used
//! cache.set("k4".to_string(), "v-k4".to_string()).unwrap();
//!
//! assert_eq!(cache.get("k2"), None); // least recently used, evicted
//! assert_eq!(cache.get("k1").as_deref(), Some("v-k1"));
//! ```

use crate::config::{ClearOptions, Strategy, UnifiedCacheConfig};
use crate::entry::{CacheNode, NodeId};
use crate::error::Result;
use crate::frequency::FrequencyBuckets;
use crate::list::List;
use crate::meta::{Metadata, ValueAndMeta};
use crate::metrics::{self, CacheMetrics, CacheStats, CoreCacheMetrics, HitCounters};
use crate::size::{ApproxSizeEstimator, SizeEstimator};
use crate::store::{DefaultHashBuilder, NodeStore};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, trace, warn};

/// Arrays longer than this are summarised in [`UnifiedCache::dump`].
const DUMP_ARRAY_LIMIT: usize = 100;

/// The order structure for the active strategy.
#[derive(Debug)]
enum Order {
    Recency(List),
    Frequency(FrequencyBuckets),
}

impl Order {
    fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Lru => Order::Recency(List::new()),
            Strategy::Lfu => Order::Frequency(FrequencyBuckets::new()),
        }
    }

    fn insert_new<K: Hash + Eq, V, S: BuildHasher>(
        &mut self,
        store: &mut NodeStore<K, V, S>,
        id: NodeId,
    ) {
        match self {
            Order::Recency(list) => list.push_front(store, id),
            Order::Frequency(buckets) => buckets.insert_new(store, id),
        }
    }

    /// Applies the "accessed" transition: move to front, or promote.
    fn touch<K: Hash + Eq, V, S: BuildHasher>(
        &mut self,
        store: &mut NodeStore<K, V, S>,
        id: NodeId,
    ) {
        match self {
            Order::Recency(list) => list.move_to_front(store, id),
            Order::Frequency(buckets) => buckets.promote(store, id),
        }
    }

    fn unlink<K: Hash + Eq, V, S: BuildHasher>(
        &mut self,
        store: &mut NodeStore<K, V, S>,
        id: NodeId,
    ) {
        match self {
            Order::Recency(list) => list.unlink(store, id),
            Order::Frequency(buckets) => buckets.remove(store, id),
        }
    }

    fn pop_victim<K: Hash + Eq, V, S: BuildHasher>(
        &mut self,
        store: &mut NodeStore<K, V, S>,
    ) -> Option<NodeId> {
        match self {
            Order::Recency(list) => list.pop_back(store),
            Order::Frequency(buckets) => buckets.pop_victim(store),
        }
    }

    /// All threaded ids: most recent first, or ascending frequency with the
    /// newest first inside each bucket.
    fn walk<K: Hash + Eq, V, S: BuildHasher>(&self, store: &NodeStore<K, V, S>) -> Vec<NodeId> {
        match self {
            Order::Recency(list) => list.iter(store).collect(),
            Order::Frequency(buckets) => buckets
                .frequencies()
                .flat_map(|freq| buckets.iter_bucket(store, freq))
                .collect(),
        }
    }
}

/// Everything the gate protects.
///
/// All algorithm logic lives here; [`UnifiedCache`] only sizes values and
/// takes the lock.
struct CacheState<K, V, S> {
    config: UnifiedCacheConfig,
    store: NodeStore<K, V, S>,
    order: Order,
    current_memory: u64,
    hits: HitCounters,
    metrics: CoreCacheMetrics,
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> CacheState<K, V, S> {
    fn new(config: UnifiedCacheConfig, hash_builder: S) -> Self {
        Self {
            store: NodeStore::with_capacity_and_hasher(config.capacity.get(), hash_builder),
            order: Order::new(config.strategy),
            current_memory: 0,
            hits: HitCounters::new(config.hit_reset_window),
            metrics: CoreCacheMetrics::default(),
            config,
        }
    }

    /// Counts a lookup and, on a hit, applies the access transition.
    fn lookup<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.hits.record_request() {
            trace!(window = self.hits.window().get(), "relative hit window reset");
        }
        let Some(id) = self.store.id_of(key) else {
            trace!("cache miss");
            return None;
        };
        self.hits.record_hit();
        self.order.touch(&mut self.store, id);
        trace!("cache hit");
        Some(id)
    }

    fn set(&mut self, key: K, value: V, size: u64, metadata: Metadata) {
        if let Some(id) = self.store.id_of(&key) {
            if let Some(node) = self.store.node_mut(id) {
                let old_size = node.replace(value, size, metadata);
                self.current_memory = self.current_memory - old_size + size;
            }
            self.order.touch(&mut self.store, id);
            self.metrics.record_update(size);
            return;
        }

        self.make_room(size);

        let id = self
            .store
            .insert(CacheNode::with_metadata(key, value, size, metadata));
        self.order.insert_new(&mut self.store, id);
        self.current_memory += size;
        self.metrics.record_insertion(size);
    }

    /// Evicts until one more entry of `incoming` bytes fits both limits, or
    /// the cache is empty.
    fn make_room(&mut self, incoming: u64) {
        let capacity = self.config.capacity.get();
        let max_memory = self.config.max_memory.get();

        if incoming > max_memory {
            warn!(
                size = incoming,
                max_memory, "value is larger than max_memory; cache will be emptied to store it"
            );
        }

        while self.store.len() >= capacity
            || self.current_memory.saturating_add(incoming) > max_memory
        {
            if !self.evict_one() {
                break;
            }
        }
    }

    fn evict_one(&mut self) -> bool {
        let Some(id) = self.order.pop_victim(&mut self.store) else {
            return false;
        };
        let Some(node) = self.store.remove(id) else {
            return false;
        };
        self.current_memory -= node.size;
        self.metrics.record_eviction(node.size);
        debug!(
            strategy = %self.config.strategy,
            size = node.size,
            freq = node.freq,
            current_memory = self.current_memory,
            "evicted entry"
        );
        true
    }

    fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Metadata) -> bool,
    {
        let ids = self.store.ids_where(|node| predicate(&node.metadata));
        for &id in &ids {
            self.order.unlink(&mut self.store, id);
            if let Some(node) = self.store.remove(id) {
                self.current_memory -= node.size;
            }
        }
        self.metrics.record_meta_removals(ids.len());
        debug!(
            removed = ids.len(),
            current_memory = self.current_memory,
            "removed entries by metadata"
        );
        ids.len()
    }

    fn reset(&mut self, options: ClearOptions) {
        if !options.is_noop() {
            options.apply(&mut self.config);
            info!(
                capacity = self.config.capacity.get(),
                max_memory = self.config.max_memory.get(),
                strategy = %self.config.strategy,
                hit_reset_window = self.config.hit_reset_window.get(),
                "cache reconfigured"
            );
        }
        self.store.clear();
        self.order = Order::new(self.config.strategy);
        self.current_memory = 0;
        self.hits.reset(self.config.hit_reset_window);
        self.metrics = CoreCacheMetrics::default();
        debug!("cache cleared");
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            strategy: self.config.strategy,
            current_nodes: self.store.len(),
            max_nodes: self.config.capacity.get(),
            current_memory: self.current_memory,
            max_memory: self.config.max_memory.get(),
            abs_hit_rate: self.hits.abs_hit_rate(),
            rel_hit_rate: self.hits.rel_hit_rate(),
        }
    }

    fn key_of(&self, id: Option<NodeId>) -> Option<&K> {
        id.and_then(|id| self.store.node(id)).map(|node| &node.key)
    }

    fn dump(&self) -> Result<String>
    where
        K: Serialize,
        V: Serialize,
    {
        #[derive(Serialize)]
        struct DumpEntry<'a, K> {
            key: &'a K,
            value: serde_json::Value,
            freq: u64,
            size: u64,
            prev: Option<&'a K>,
            next: Option<&'a K>,
        }

        let mut entries = Vec::with_capacity(self.store.len());
        for id in self.order.walk(&self.store) {
            let Some(node) = self.store.node(id) else {
                continue;
            };
            let mut value = serde_json::to_value(&node.value)?;
            summarise_long_arrays(&mut value);
            entries.push(DumpEntry {
                key: &node.key,
                value,
                freq: node.freq,
                size: node.size,
                prev: self.key_of(node.prev()),
                next: self.key_of(node.next()),
            });
        }

        Ok(serde_json::to_string_pretty(&entries)?)
    }

    #[cfg(test)]
    fn check_invariants(&self) -> core::result::Result<(), String> {
        let total: u64 = self.store.iter().map(|(_, node)| node.size).sum();
        if total != self.current_memory {
            return Err(format!(
                "current_memory {} != sum of sizes {}",
                self.current_memory, total
            ));
        }
        let threaded = match &self.order {
            Order::Recency(list) => {
                if list.len() != list.iter(&self.store).count() {
                    return Err("recency list length mismatch".into());
                }
                list.len()
            }
            Order::Frequency(buckets) => {
                for (_, node) in self.store.iter() {
                    if buckets.bucket_len(node.freq) == 0 {
                        return Err(format!("no bucket for frequency {}", node.freq));
                    }
                }
                for freq in buckets.frequencies() {
                    for id in buckets.iter_bucket(&self.store, freq) {
                        if self.store.node(id).map(|node| node.freq) != Some(freq) {
                            return Err(format!("stray node in bucket {freq}"));
                        }
                    }
                }
                if !self.store.is_empty() && buckets.bucket_len(buckets.min_freq()) == 0 {
                    return Err(format!("min_freq {} has no bucket", buckets.min_freq()));
                }
                self.order.walk(&self.store).len()
            }
        };
        if threaded != self.store.len() {
            return Err(format!(
                "{} nodes threaded, {} stored",
                threaded,
                self.store.len()
            ));
        }
        Ok(())
    }
}

fn summarise_long_arrays(value: &mut serde_json::Value) {
    use serde_json::Value;

    match value {
        Value::Array(items) => {
            if items.len() > DUMP_ARRAY_LIMIT {
                let summary = format!("[ ... {} items ]", items.len());
                *value = Value::String(summary);
            } else {
                items.iter_mut().for_each(summarise_long_arrays);
            }
        }
        Value::Object(map) => map.values_mut().for_each(summarise_long_arrays),
        _ => {}
    }
}

/// A thread-safe key-value cache with LRU or LFU eviction under an entry
/// limit and an approximate memory limit.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone`.
/// - `V`: Value type. Getters that return owned values need `V: Clone`.
/// - `E`: [`SizeEstimator`] for `V`. Defaults to [`ApproxSizeEstimator`].
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Locking
///
/// All methods take `&self` and serialize on one internal mutex. Predicates
/// and closures passed to [`get_with`](Self::get_with),
/// [`get_by_meta`](Self::get_by_meta) and
/// [`remove_by_meta`](Self::remove_by_meta) run while that mutex is held and
/// must not call back into the same cache.
///
/// # Example
///
/// ```
/// use unified_cache::UnifiedCache;
/// use unified_cache::meta::metadata;
/// use serde_json::json;
///
/// let cache: UnifiedCache<String, String> = UnifiedCache::new(100, 1024 * 1024).unwrap();
/// cache
///     .set_with_meta("key1".into(), "data1".into(), metadata([("tenant", json!("a"))]))
///     .unwrap();
/// cache.set("key2".into(), "data2".into()).unwrap();
///
/// assert_eq!(cache.get("key1").as_deref(), Some("data1"));
/// assert_eq!(cache.get_meta("key2"), Some(Default::default()));
/// assert_eq!(cache.get_by_meta(|m| m.get("tenant") == Some(&json!("a"))), ["data1"]);
///
/// let stats = cache.stats();
/// assert_eq!(stats.current_nodes, 2);
/// assert_eq!(stats.abs_hit_rate, 1.0);
/// ```
pub struct UnifiedCache<K, V, E = ApproxSizeEstimator, S = DefaultHashBuilder> {
    state: Mutex<CacheState<K, V, S>>,
    estimator: E,
}

impl<K, V> UnifiedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: crate::size::ApproxSize,
{
    /// Creates an LRU cache with the default hit-reset window (1000) and the
    /// [`ApproxSizeEstimator`].
    ///
    /// Fails with [`CacheError::InvalidConfiguration`](crate::CacheError::InvalidConfiguration)
    /// if either limit is zero.
    pub fn new(capacity: usize, max_memory: u64) -> Result<Self> {
        let config = UnifiedCacheConfig::try_new(capacity, max_memory)?;
        Ok(Self::init(config, ApproxSizeEstimator))
    }
}

impl<K, V, E> UnifiedCache<K, V, E>
where
    K: Hash + Eq + Clone,
    E: SizeEstimator<V>,
{
    /// Creates a cache from a configuration and a size estimator.
    pub fn init(config: UnifiedCacheConfig, estimator: E) -> Self {
        Self::with_hasher(config, estimator, DefaultHashBuilder::default())
    }
}

impl<K, V, E, S> UnifiedCache<K, V, E, S>
where
    K: Hash + Eq + Clone,
    E: SizeEstimator<V>,
    S: BuildHasher,
{
    /// Creates a cache with a custom hash builder.
    pub fn with_hasher(config: UnifiedCacheConfig, estimator: E, hash_builder: S) -> Self {
        debug!(
            capacity = config.capacity.get(),
            max_memory = config.max_memory.get(),
            strategy = %config.strategy,
            hit_reset_window = config.hit_reset_window.get(),
            "cache created"
        );
        Self {
            state: Mutex::new(CacheState::new(config, hash_builder)),
            estimator,
        }
    }

    /// Stores `value` under `key` with empty metadata.
    ///
    /// See [`set_with_meta`](Self::set_with_meta).
    pub fn set(&self, key: K, value: V) -> Result<()> {
        self.set_with_meta(key, value, Metadata::new())
    }

    /// Stores `value` under `key` together with `metadata`.
    ///
    /// If the key exists, its value, size and metadata are replaced in place
    /// and the update counts as an access. Otherwise entries are evicted
    /// until both limits leave room, and the new entry starts at frequency 1.
    ///
    /// Fails with [`CacheError::UnestimableValue`](crate::CacheError::UnestimableValue)
    /// if the estimator cannot size `value`; the cache is not modified.
    pub fn set_with_meta(&self, key: K, value: V, metadata: Metadata) -> Result<()> {
        let size = self.estimator.estimate(&value)?;
        self.state.lock().set(key, value, size, metadata);
        Ok(())
    }

    /// Looks up `key`, counting the request toward both hit rates.
    ///
    /// A hit moves the entry to the front (LRU) or raises its frequency (LFU).
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Like [`get`](Self::get), but applies `f` to the value under the lock
    /// instead of cloning it.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        let mut state = self.state.lock();
        let id = state.lookup(key)?;
        state.store.node(id).map(|node| f(&node.value))
    }

    /// Returns the metadata of `key`: empty if none was set, `None` if the
    /// key is absent. Does not count as a lookup and does not reorder.
    pub fn get_meta<Q>(&self, key: &Q) -> Option<Metadata>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let state = self.state.lock();
        state.store.get(key).map(|node| node.metadata.clone())
    }

    /// Returns the value and metadata of `key` without counting a lookup or
    /// reordering.
    pub fn get_value_and_meta<Q>(&self, key: &Q) -> Option<ValueAndMeta<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let state = self.state.lock();
        state
            .store
            .get(key)
            .map(|node| ValueAndMeta::new(node.value.clone(), node.metadata.clone()))
    }

    /// Values of every entry whose metadata satisfies `predicate`, in no
    /// particular order. Read-only.
    pub fn get_by_meta<F>(&self, mut predicate: F) -> Vec<V>
    where
        F: FnMut(&Metadata) -> bool,
        V: Clone,
    {
        let state = self.state.lock();
        state
            .store
            .iter()
            .filter(|(_, node)| predicate(&node.metadata))
            .map(|(_, node)| node.value.clone())
            .collect()
    }

    /// Removes every entry whose metadata satisfies `predicate` and returns
    /// how many were removed.
    pub fn remove_by_meta<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&Metadata) -> bool,
    {
        self.state.lock().remove_where(predicate)
    }

    /// Drops all entries and zeroes both hit rates. Limits and strategy are
    /// kept.
    pub fn clear(&self) {
        self.clear_with(ClearOptions::default());
    }

    /// Drops all entries, zeroes both hit rates, and applies any limits,
    /// strategy or window given in `options`.
    pub fn clear_with(&self, options: ClearOptions) {
        self.state.lock().reset(options);
    }

    /// Snapshot of occupancy and hit rates.
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats()
    }

    /// Pretty JSON array describing every entry: key, value, freq, size and
    /// the keys of its neighbours in the order structure. Arrays longer than
    /// 100 items inside values are summarised.
    ///
    /// Entries are listed most recent first under LRU, and by ascending
    /// frequency under LFU.
    ///
    /// For diagnostics only; the format is not stable.
    pub fn dump(&self) -> Result<String>
    where
        K: Serialize,
        V: Serialize,
    {
        self.state.lock().dump()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.state.lock().store.len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.state.lock().store.is_empty()
    }

    /// Active eviction strategy.
    pub fn strategy(&self) -> Strategy {
        self.state.lock().config.strategy
    }

    /// Entry limit.
    pub fn capacity(&self) -> usize {
        self.state.lock().config.capacity.get()
    }

    /// Approximate memory limit in bytes.
    pub fn max_memory(&self) -> u64 {
        self.state.lock().config.max_memory.get()
    }

    /// Sum of the approximate sizes of stored values.
    pub fn current_memory(&self) -> u64 {
        self.state.lock().current_memory
    }

    /// Current configuration, including changes made by clears.
    pub fn config(&self) -> UnifiedCacheConfig {
        self.state.lock().config
    }
}

impl<K, V, E, S> CacheMetrics for UnifiedCache<K, V, E, S>
where
    K: Hash + Eq + Clone,
    E: SizeEstimator<V>,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        let state = self.state.lock();
        metrics::to_btreemap(&state.metrics, &state.hits, &state.stats())
    }

    fn algorithm_name(&self) -> &'static str {
        self.state.lock().config.strategy.as_str()
    }
}

impl<K, V, E, S> core::fmt::Debug for UnifiedCache<K, V, E, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut out = f.debug_struct("UnifiedCache");
        match self.state.try_lock() {
            Some(state) => out
                .field("config", &state.config)
                .field("len", &state.store.len())
                .field("current_memory", &state.current_memory)
                .finish(),
            None => out.field("state", &"<locked>").finish(),
        }
    }
}
