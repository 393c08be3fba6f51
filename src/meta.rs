//! Per-Entry Metadata
//!
//! Every entry can carry a small string-keyed map of arbitrary JSON values,
//! supplied with [`UnifiedCache::set_with_meta`](crate::UnifiedCache::set_with_meta).
//! Metadata is opaque to eviction: it is only read by the metadata queries
//! (`get_meta`, `get_value_and_meta`, `get_by_meta`, `remove_by_meta`).
//!
//! # Usage
//!
//! ```
//! use unified_cache::meta::Metadata;
//! use serde_json::json;
//!
//! let mut meta = Metadata::new();
//! meta.insert("tenant".to_string(), json!("acme"));
//! meta.insert("version".to_string(), json!(3));
//!
//! let is_acme = |m: &Metadata| m.get("tenant") == Some(&json!("acme"));
//! assert!(is_acme(&meta));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata attached to a cache entry.
///
/// A `BTreeMap` keeps snapshots and debug output in a stable key order.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A value together with the metadata stored alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAndMeta<V> {
    /// The cached value.
    pub value: V,
    /// The entry's metadata; empty if none was supplied.
    pub meta: Metadata,
}

impl<V> ValueAndMeta<V> {
    /// Pairs a value with its metadata.
    pub fn new(value: V, meta: Metadata) -> Self {
        Self { value, meta }
    }
}

/// Builds a [`Metadata`] map from `(key, value)` pairs.
///
/// ```
/// use unified_cache::meta::metadata;
/// use serde_json::json;
///
/// let meta = metadata([("meta1", json!("mv1")), ("meta2", json!("mv2"))]);
/// assert_eq!(meta.len(), 2);
/// ```
pub fn metadata<I, S>(pairs: I) -> Metadata
where
    I: IntoIterator<Item = (S, serde_json::Value)>,
    S: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_and_meta_serializes_flat() {
        let pair = ValueAndMeta::new("data1", metadata([("meta1", json!("mv1"))]));
        let encoded = serde_json::to_value(&pair).unwrap();
        assert_eq!(encoded, json!({"value": "data1", "meta": {"meta1": "mv1"}}));
    }

    #[test]
    fn test_metadata_builder_overwrites_duplicates() {
        let meta = metadata([("a", json!(1)), ("a", json!(2))]);
        assert_eq!(meta.len(), 1);
        assert_eq!(meta["a"], json!(2));
    }
}
