//! Options for [`UnifiedCache::clear_with`](crate::UnifiedCache::clear_with).
//!
//! Every field is optional. A field left as `None` keeps the value the cache
//! already has.
//!
//! ```
//! use unified_cache::config::{ClearOptions, Strategy};
//! use unified_cache::UnifiedCache;
//!
//! let cache: UnifiedCache<String, String> = UnifiedCache::new(100, 1024).unwrap();
//! cache.clear_with(ClearOptions::new().strategy(Strategy::Lfu).try_capacity(10).unwrap());
//! assert_eq!(cache.strategy(), Strategy::Lfu);
//! assert_eq!(cache.capacity(), 10);
//! assert_eq!(cache.max_memory(), 1024);
//! ```

use super::{Strategy, UnifiedCacheConfig};
use crate::error::{CacheError, Result};
use core::num::{NonZeroU64, NonZeroUsize};
use serde::{Deserialize, Serialize};

/// Reconfiguration applied by a clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClearOptions {
    /// New entry limit.
    pub capacity: Option<NonZeroUsize>,
    /// New approximate memory limit in bytes.
    pub max_memory: Option<NonZeroU64>,
    /// New eviction strategy.
    pub strategy: Option<Strategy>,
    /// New relative hit-rate window.
    #[serde(alias = "hitReset")]
    pub hit_reset_window: Option<NonZeroU64>,
}

impl ClearOptions {
    /// Options that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry limit.
    pub fn capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Replaces the entry limit from a raw integer, rejecting zero.
    pub fn try_capacity(self, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| CacheError::invalid_config("capacity must be greater than zero"))?;
        Ok(self.capacity(capacity))
    }

    /// Replaces the memory limit.
    pub fn max_memory(mut self, max_memory: NonZeroU64) -> Self {
        self.max_memory = Some(max_memory);
        self
    }

    /// Replaces the memory limit from a raw integer, rejecting zero.
    pub fn try_max_memory(self, max_memory: u64) -> Result<Self> {
        let max_memory = NonZeroU64::new(max_memory)
            .ok_or_else(|| CacheError::invalid_config("max_memory must be greater than zero"))?;
        Ok(self.max_memory(max_memory))
    }

    /// Replaces the eviction strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Replaces the relative hit-rate window.
    pub fn hit_reset_window(mut self, window: NonZeroU64) -> Self {
        self.hit_reset_window = Some(window);
        self
    }

    /// Returns `true` if applying these options would leave a config unchanged.
    pub fn is_noop(&self) -> bool {
        self.capacity.is_none()
            && self.max_memory.is_none()
            && self.strategy.is_none()
            && self.hit_reset_window.is_none()
    }

    /// Applies the present fields onto `config`.
    pub(crate) fn apply(&self, config: &mut UnifiedCacheConfig) {
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(max_memory) = self.max_memory {
            config.max_memory = max_memory;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(window) = self.hit_reset_window {
            config.hit_reset_window = window;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_omitted_fields() {
        let mut config = UnifiedCacheConfig::try_new(100, 1024).unwrap();
        let options = ClearOptions::new().try_capacity(10).unwrap();
        assert!(!options.is_noop());
        options.apply(&mut config);

        assert_eq!(config.capacity.get(), 10);
        assert_eq!(config.max_memory.get(), 1024);
        assert_eq!(config.strategy, Strategy::Lru);
    }

    #[test]
    fn test_apply_all_fields() {
        let mut config = UnifiedCacheConfig::try_new(100, 1024).unwrap();
        ClearOptions::new()
            .try_capacity(10)
            .unwrap()
            .try_max_memory(140_000)
            .unwrap()
            .strategy(Strategy::Lfu)
            .hit_reset_window(NonZeroU64::new(10).unwrap())
            .apply(&mut config);

        assert_eq!(config.capacity.get(), 10);
        assert_eq!(config.max_memory.get(), 140_000);
        assert_eq!(config.strategy, Strategy::Lfu);
        assert_eq!(config.hit_reset_window.get(), 10);
    }

    #[test]
    fn test_zero_is_rejected() {
        assert!(ClearOptions::new().try_capacity(0).is_err());
        assert!(ClearOptions::new().try_max_memory(0).is_err());
        assert!(ClearOptions::new().is_noop());
    }

    #[test]
    fn test_from_json() {
        let options: ClearOptions =
            serde_json::from_str(r#"{"capacity": 10, "hitReset": 5}"#).unwrap();
        assert_eq!(options.capacity.map(NonZeroUsize::get), Some(10));
        assert_eq!(options.hit_reset_window.map(NonZeroU64::get), Some(5));
        assert_eq!(options.strategy, None);
    }
}
