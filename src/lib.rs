#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Strategy Selection Guide
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │              Which Eviction Strategy Should I Use?               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  Is your workload primarily...                                   │
//! │                                                                  │
//! │  ┌─────────────────┐                                             │
//! │  │ Recency-based?  │──Yes──▶ ┌──────────┐                        │
//! │  │ (recent = hot)  │         │   LRU    │                        │
//! │  └────────┬────────┘         └──────────┘                        │
//! │          No                                                      │
//! │           ▼                                                      │
//! │  ┌─────────────────┐                                             │
//! │  │ Frequency-based?│──Yes──▶ ┌──────────┐                        │
//! │  │ (popular = hot) │         │   LFU    │                        │
//! │  └─────────────────┘         └──────────┘                        │
//! │                                                                  │
//! │  Unsure? Start with LRU, compare `stats()` hit rates, and switch │
//! │  with `clear_with(ClearOptions::new().strategy(..))`.            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Performance Characteristics
//!
//! | Strategy | Get | Set | Evict | getByMeta / removeByMeta |
//! |----------|-----|-----|-------|--------------------------|
//! | LRU      | O(1)| O(1)| O(1)  | O(n)                     |
//! | LFU      | O(1)| O(1)| O(1)* | O(n)                     |
//!
//! \* Promotion and victim selection touch an ordered map of frequency
//! buckets, so strictly O(log F) for F distinct frequencies. F is small in
//! practice and does not grow with the number of entries at one frequency.
//!
//! ## Code Examples
//!
//! ### LRU (Least Recently Used)
//!
//! ```rust
//! use unified_cache::UnifiedCache;
//!
//! let cache: UnifiedCache<&str, i32> = UnifiedCache::new(2, u64::MAX).unwrap();
//! cache.set("a", 1).unwrap();
//! cache.set("b", 2).unwrap();
//! cache.get(&"a");          // "a" becomes most recently used
//! cache.set("c", 3).unwrap(); // "b" evicted
//! assert!(cache.get(&"b").is_none());
//! ```
//!
//! ### LFU (Least Frequently Used)
//!
//! ```rust
//! use unified_cache::{Strategy, UnifiedCache, UnifiedCacheConfig};
//!
//! let config = UnifiedCacheConfig::try_new(2, u64::MAX)
//!     .unwrap()
//!     .with_strategy(Strategy::Lfu);
//! let cache: UnifiedCache<&str, i32> = UnifiedCache::init(config, Default::default());
//! cache.set("rare", 1).unwrap();
//! cache.set("popular", 2).unwrap();
//! for _ in 0..10 {
//!     cache.get(&"popular");
//! }
//! cache.set("new", 3).unwrap(); // "rare" evicted (lowest frequency)
//! assert!(cache.get(&"popular").is_some());
//! ```
//!
//! ### Memory Limit and Custom Sizing
//!
//! Sizes are estimates, never measurements. Plug in any
//! [`SizeEstimator`], including a closure:
//!
//! ```rust
//! use unified_cache::{UnifiedCache, UnifiedCacheConfig};
//!
//! let config = UnifiedCacheConfig::try_new(1000, 4096).unwrap();
//! let by_len = |v: &Vec<u8>| v.len() as u64;
//! let cache: UnifiedCache<String, Vec<u8>, _> = UnifiedCache::init(config, by_len);
//!
//! cache.set("a".into(), vec![0; 3000]).unwrap();
//! cache.set("b".into(), vec![0; 3000]).unwrap(); // "a" evicted
//! assert_eq!(cache.current_memory(), 3000);
//! ```
//!
//! ### Metadata
//!
//! ```rust
//! use unified_cache::UnifiedCache;
//! use unified_cache::meta::metadata;
//! use serde_json::json;
//!
//! let cache: UnifiedCache<String, String> = UnifiedCache::new(100, 1 << 20).unwrap();
//! cache.set_with_meta("u1".into(), "alice".into(), metadata([("role", json!("admin"))])).unwrap();
//! cache.set_with_meta("u2".into(), "bob".into(), metadata([("role", json!("guest"))])).unwrap();
//!
//! let removed = cache.remove_by_meta(|m| m["role"] == "guest");
//! assert_eq!(removed, 1);
//! assert_eq!(cache.get_by_meta(|_| true), ["alice"]);
//! ```
//!
//! ## Concurrency
//!
//! [`UnifiedCache`] is `Send + Sync` whenever its keys and values are `Send`.
//! Every operation runs under one internal lock:
//!
//! ```rust
//! use unified_cache::UnifiedCache;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(UnifiedCache::<String, u64>::new(10_000, 1 << 20).unwrap());
//! let cache_clone = Arc::clone(&cache);
//! std::thread::spawn(move || {
//!     cache_clone.set("key".to_string(), 42).unwrap();
//! })
//! .join()
//! .unwrap();
//! assert_eq!(cache.get("key"), Some(42));
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: The [`UnifiedCache`] itself
//! - [`config`]: Construction and reconfiguration options
//! - [`meta`]: Entry metadata types
//! - [`size`]: Value size estimation
//! - [`metrics`]: Hit rates and counters
//! - [`error`]: Error type

/// The cache: one lock guarding a node store and an LRU or LFU order.
pub mod cache;

/// Cache configuration structures.
///
/// Provides the construction-time configuration and the options accepted
/// when clearing.
pub mod config;

/// Per-key node record stored in the arena.
pub(crate) mod entry;

/// Error type and result alias.
pub mod error;

/// Entry metadata: a JSON-valued map attached to each entry.
pub mod meta;

/// Cache metrics system.
///
/// Provides the `stats()` snapshot, the rolling hit-rate counters, and a
/// `BTreeMap` metrics report.
pub mod metrics;

/// Approximate value sizing for the memory limit.
pub mod size;

/// Slot arena and key index.
///
/// Internal infrastructure; order structures address nodes by id through it.
pub(crate) mod store;

/// Doubly linked list threaded through arena node ids.
pub(crate) mod list;

/// Frequency buckets for LFU.
pub(crate) mod frequency;

pub use cache::UnifiedCache;
pub use config::{ClearOptions, Strategy, UnifiedCacheConfig};
pub use error::{CacheError, Result};
pub use meta::{Metadata, ValueAndMeta};
pub use metrics::{CacheMetrics, CacheStats};
pub use size::{ApproxSize, ApproxSizeEstimator, JsonSizeEstimator, SizeEstimator};
