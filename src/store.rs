//! Node Store
//!
//! The store is the single source of truth for which keys are cached. It is
//! a slot arena of [`CacheNode`]s plus a key index mapping each key to its
//! [`NodeId`]. Order structures hold ids into this arena and relink nodes
//! through [`NodeStore::node_mut`]; they never own nodes.
//!
//! Slots freed by removal are recycled through a free list, so ids stay small
//! and the arena does not grow past the peak entry count.

use crate::entry::{CacheNode, NodeId};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
pub(crate) use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
pub(crate) use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Arena-backed mapping from key to node.
pub struct NodeStore<K, V, S = DefaultHashBuilder> {
    slots: Vec<Option<CacheNode<K, V>>>,
    free_list: Vec<usize>,
    index: HashMap<K, NodeId, S>,
}

impl<K: Hash + Eq, V, S: BuildHasher> NodeStore<K, V, S> {
    /// Creates an empty store sized for `capacity` entries.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Number of stored nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the store holds no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Looks up the id of `key`.
    #[inline]
    pub fn id_of<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.get(key).copied()
    }

    /// Looks up the node for `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&CacheNode<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.id_of(key).and_then(|id| self.node(id))
    }

    /// Returns the node in slot `id`, if occupied.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&CacheNode<K, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Returns the node in slot `id` mutably, if occupied.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut CacheNode<K, V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Inserts a new node and returns its id.
    ///
    /// The caller must have checked that the key is absent; an existing
    /// mapping for the same key would be replaced and its slot leaked.
    pub fn insert(&mut self, node: CacheNode<K, V>) -> NodeId
    where
        K: Clone,
    {
        debug_assert!(self.index.get(&node.key).is_none());
        let key = node.key.clone();
        let id = match self.free_list.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                NodeId(idx)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };
        self.index.insert(key, id);
        id
    }

    /// Removes the node in slot `id` from the arena and the key index.
    ///
    /// The node must already be unlinked from its order structure.
    pub fn remove(&mut self, id: NodeId) -> Option<CacheNode<K, V>> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.index.remove(&node.key);
        self.free_list.push(id.0);
        Some(node)
    }

    /// Iterates over all stored nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CacheNode<K, V>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|node| (NodeId(idx), node)))
    }

    /// Ids of all nodes for which `f` returns `true`.
    pub fn ids_where<F>(&self, mut f: F) -> Vec<NodeId>
    where
        F: FnMut(&CacheNode<K, V>) -> bool,
    {
        self.iter()
            .filter_map(|(id, node)| f(node).then_some(id))
            .collect()
    }

    /// Drops every node, keeping allocations.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.index.clear();
    }
}

impl<K, V, S> core::fmt::Debug for NodeStore<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeStore")
            .field("len", &self.index.len())
            .field("slots", &self.slots.len())
            .field("free", &self.free_list.len())
            .finish()
    }
}
