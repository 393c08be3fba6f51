//! Configuration for [`UnifiedCache`](crate::UnifiedCache).
//!
//! # Examples
//!
//! ```
//! use unified_cache::config::{Strategy, UnifiedCacheConfig};
//! use core::num::{NonZeroU64, NonZeroUsize};
//!
//! // Public fields, like every other config in this crate
//! let config = UnifiedCacheConfig {
//!     capacity: NonZeroUsize::new(10_000).unwrap(),
//!     max_memory: NonZeroU64::new(50 * 1024 * 1024).unwrap(), // 50MB
//!     strategy: Strategy::Lru,
//!     hit_reset_window: NonZeroU64::new(1000).unwrap(),
//! };
//! assert_eq!(config.capacity.get(), 10_000);
//!
//! // Or validated from raw integers
//! assert!(UnifiedCacheConfig::try_new(0, 1024).is_err());
//! ```

use super::Strategy;
use crate::error::{CacheError, Result};
use core::fmt;
use core::num::{NonZeroU64, NonZeroUsize};
use serde::{Deserialize, Serialize};

/// Default number of lookups after which the relative hit counters restart.
pub const DEFAULT_HIT_RESET_WINDOW: u64 = 1000;

/// Configuration for a [`UnifiedCache`](crate::UnifiedCache).
///
/// # Fields
///
/// - `capacity`: Maximum number of entries.
/// - `max_memory`: Maximum sum of approximate value sizes, in bytes.
/// - `strategy`: Which eviction policy is active.
/// - `hit_reset_window`: Number of lookups the relative hit rate covers
///   before it restarts.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedCacheConfig {
    /// Maximum number of key-value pairs the cache can hold.
    pub capacity: NonZeroUsize,
    /// Maximum total approximate size in bytes of cached values.
    pub max_memory: NonZeroU64,
    /// Active eviction strategy.
    #[serde(default)]
    pub strategy: Strategy,
    /// Lookups per relative hit-rate window.
    #[serde(default = "default_hit_reset_window", alias = "hitReset")]
    pub hit_reset_window: NonZeroU64,
}

const DEFAULT_WINDOW: NonZeroU64 = match NonZeroU64::new(DEFAULT_HIT_RESET_WINDOW) {
    Some(window) => window,
    None => panic!("default hit reset window is zero"),
};

fn default_hit_reset_window() -> NonZeroU64 {
    DEFAULT_WINDOW
}

impl UnifiedCacheConfig {
    /// Creates an LRU config with the default hit-reset window.
    pub fn new(capacity: NonZeroUsize, max_memory: NonZeroU64) -> Self {
        Self {
            capacity,
            max_memory,
            strategy: Strategy::Lru,
            hit_reset_window: default_hit_reset_window(),
        }
    }

    /// Creates a config from raw integers, rejecting zero limits.
    pub fn try_new(capacity: usize, max_memory: u64) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| CacheError::invalid_config("capacity must be greater than zero"))?;
        let max_memory = NonZeroU64::new(max_memory)
            .ok_or_else(|| CacheError::invalid_config("max_memory must be greater than zero"))?;
        Ok(Self::new(capacity, max_memory))
    }

    /// Sets the eviction strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the relative hit-rate window.
    pub fn with_hit_reset_window(mut self, window: NonZeroU64) -> Self {
        self.hit_reset_window = window;
        self
    }

    /// Sets the relative hit-rate window from a raw integer, rejecting zero.
    pub fn try_with_hit_reset_window(self, window: u64) -> Result<Self> {
        let window = NonZeroU64::new(window).ok_or_else(|| {
            CacheError::invalid_config("hit_reset_window must be greater than zero")
        })?;
        Ok(self.with_hit_reset_window(window))
    }
}

impl fmt::Debug for UnifiedCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnifiedCacheConfig")
            .field("capacity", &self.capacity)
            .field("max_memory", &self.max_memory)
            .field("strategy", &self.strategy)
            .field("hit_reset_window", &self.hit_reset_window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = UnifiedCacheConfig::try_new(100, 1024 * 1024).unwrap();
        assert_eq!(config.capacity.get(), 100);
        assert_eq!(config.max_memory.get(), 1024 * 1024);
        assert_eq!(config.strategy, Strategy::Lru);
        assert_eq!(config.hit_reset_window.get(), DEFAULT_HIT_RESET_WINDOW);
    }

    #[test]
    fn test_config_rejects_zero_limits() {
        let err = UnifiedCacheConfig::try_new(0, 10).unwrap_err();
        assert!(err.to_string().contains("capacity"));

        let err = UnifiedCacheConfig::try_new(10, 0).unwrap_err();
        assert!(err.to_string().contains("max_memory"));

        let err = UnifiedCacheConfig::try_new(10, 10)
            .unwrap()
            .try_with_hit_reset_window(0)
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_config_builders() {
        let config = UnifiedCacheConfig::try_new(3, 100)
            .unwrap()
            .with_strategy(Strategy::Lfu)
            .try_with_hit_reset_window(10)
            .unwrap();
        assert_eq!(config.strategy, Strategy::Lfu);
        assert_eq!(config.hit_reset_window.get(), 10);
    }

    #[test]
    fn test_config_from_json() {
        let config: UnifiedCacheConfig =
            serde_json::from_str(r#"{"capacity": 3, "maxMemory": 100, "strategy": "LFU"}"#)
                .unwrap();
        assert_eq!(config.capacity.get(), 3);
        assert_eq!(config.max_memory.get(), 100);
        assert_eq!(config.strategy, Strategy::Lfu);
        assert_eq!(config.hit_reset_window.get(), DEFAULT_HIT_RESET_WINDOW);

        let zero = serde_json::from_str::<UnifiedCacheConfig>(r#"{"capacity": 0, "maxMemory": 1}"#);
        assert!(zero.is_err());
    }
}
