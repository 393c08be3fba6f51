//! Cache Configuration Module
//!
//! This module provides the configuration structures for [`UnifiedCache`](crate::UnifiedCache).
//! Configuration structs have public fields for simple instantiation, with
//! validating constructors for callers that start from raw integers.
//!
//! # Sizing Guidelines
//!
//! ## Understanding `max_memory` and `capacity`
//!
//! - **`max_memory`**: Upper bound on the sum of the *approximate* sizes of cached
//!   values, as reported by the cache's [`SizeEstimator`](crate::size::SizeEstimator).
//!   It is an accounting budget, not a hard allocator limit.
//! - **`capacity`**: Maximum number of entries. Each entry carries bookkeeping
//!   (key copy, links, metadata map) beyond its value size.
//!
//! Both limits are enforced before every insertion of a new key. Whichever is
//! hit first drives eviction.
//!
//! # Configs
//!
//! | Type | Used by | Description |
//! |------|---------|-------------|
//! | [`UnifiedCacheConfig`] | [`UnifiedCache::init`](crate::UnifiedCache::init) | Limits, strategy and hit-rate window |
//! | [`ClearOptions`] | [`UnifiedCache::clear_with`](crate::UnifiedCache::clear_with) | Optional reconfiguration on clear |
//! | [`Strategy`] | both | LRU or LFU eviction |
//!
//! # Examples
//!
//! ```
//! use unified_cache::config::{Strategy, UnifiedCacheConfig};
//! use unified_cache::UnifiedCache;
//!
//! // 100 entries, 1MB of approximate value size, LFU eviction
//! let config = UnifiedCacheConfig::try_new(100, 1024 * 1024)
//!     .unwrap()
//!     .with_strategy(Strategy::Lfu);
//! let cache: UnifiedCache<String, String> = UnifiedCache::init(config, Default::default());
//! assert_eq!(cache.strategy(), Strategy::Lfu);
//! ```

pub mod cache;
pub mod clear;

pub use cache::UnifiedCacheConfig;
pub use clear::ClearOptions;

use crate::error::CacheError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Eviction strategy of a cache.
///
/// Only one order structure is live at a time. Switching strategy is done
/// through [`ClearOptions`], which also empties the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Evict the entry that was touched least recently.
    #[default]
    #[serde(rename = "LRU", alias = "lru")]
    Lru,
    /// Evict an entry with the lowest access count.
    #[serde(rename = "LFU", alias = "lfu")]
    Lfu,
}

impl Strategy {
    /// Short upper-case name, as reported in stats.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Lru => "LRU",
            Strategy::Lfu => "LFU",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("lru") {
            Ok(Strategy::Lru)
        } else if s.eq_ignore_ascii_case("lfu") {
            Ok(Strategy::Lfu)
        } else {
            Err(CacheError::invalid_config(format!(
                "unknown strategy {s:?}, expected \"LRU\" or \"LFU\""
            )))
        }
    }
}
