//! Cache Node Type
//!
//! A [`CacheNode`] is the single record the cache keeps per key. It owns the
//! key, value, approximate size, access frequency and user metadata, plus the
//! links that thread it through the active order structure.
//!
//! # Links
//!
//! Nodes live in the slot arena of the [`NodeStore`](crate::store::NodeStore)
//! and are addressed by [`NodeId`]. `prev`/`next` are ids, not references, so
//! the order structures can relink nodes without owning them. The same two
//! links serve the recency list (LRU) and the per-frequency bucket lists
//! (LFU); a node is only ever threaded through one of them.
//!
//! # Memory Layout
//!
//! Beyond key and value, each node carries:
//! - `size: u64` - 8 bytes
//! - `freq: u64` - 8 bytes
//! - `metadata` - an empty `BTreeMap` allocates nothing
//! - `prev`/`next` - 2 × `Option<NodeId>`

use crate::meta::Metadata;
use core::fmt;

/// Stable handle to a node in the arena.
///
/// Ids are reused after a node is removed, so they must not be held across
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Slot index in the arena.
    #[cfg(test)]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A cached entry with its accounting and link fields.
pub struct CacheNode<K, V> {
    /// The cached key.
    pub key: K,

    /// The cached value.
    pub value: V,

    /// Approximate size of `value` in bytes, as reported by the estimator.
    pub size: u64,

    /// Access count. Starts at 1 and only grows while the node lives.
    pub freq: u64,

    /// User metadata attached on `set`. Empty when none was given.
    pub metadata: Metadata,

    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl<K, V> CacheNode<K, V> {
    /// Creates an unlinked node at frequency 1 with no metadata.
    #[cfg(test)]
    pub fn new(key: K, value: V, size: u64) -> Self {
        Self::with_metadata(key, value, size, Metadata::new())
    }

    /// Creates an unlinked node at frequency 1 with the given metadata.
    #[inline]
    pub fn with_metadata(key: K, value: V, size: u64, metadata: Metadata) -> Self {
        Self {
            key,
            value,
            size,
            freq: 1,
            metadata,
            prev: None,
            next: None,
        }
    }

    /// Swaps in a new value, size and metadata, returning the previous size.
    ///
    /// Frequency and links are left alone; the caller decides how the update
    /// counts as an access.
    #[inline]
    pub(crate) fn replace(&mut self, value: V, size: u64, metadata: Metadata) -> u64 {
        self.value = value;
        self.metadata = metadata;
        core::mem::replace(&mut self.size, size)
    }

    /// Previous node in the order structure the node is threaded through.
    #[inline]
    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    /// Next node in the order structure the node is threaded through.
    #[inline]
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    #[inline]
    pub(crate) fn unlink(&mut self) {
        self.prev = None;
        self.next = None;
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CacheNode<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheNode")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("size", &self.size)
            .field("freq", &self.freq)
            .field("metadata", &self.metadata)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}
