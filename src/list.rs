//! Index-linked doubly linked list over the node arena.
//!
//! The list stores only its `head`, `tail` and length. The `prev`/`next`
//! links live inside each [`CacheNode`](crate::entry::CacheNode) and are
//! [`NodeId`]s into the [`NodeStore`], so every operation takes the store by
//! mutable reference and relinks nodes in place. All operations are O(1).
//!
//! Head is the most recently added or touched node, tail is the oldest.
//! The LRU order structure is one `List`; each LFU frequency bucket is
//! another.
//!
//! # Examples
//!
//! ```ignore
//! let mut list = List::new();
//! list.push_front(&mut store, a);
//! list.push_front(&mut store, b); // b, a
//! list.move_to_front(&mut store, a); // a, b
//! assert_eq!(list.pop_back(&mut store), Some(b));
//! ```

use crate::entry::NodeId;
use crate::store::NodeStore;
use core::hash::{BuildHasher, Hash};

/// Head/tail anchors of an index-linked list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct List {
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl List {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes threaded through the list.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently added or touched node.
    #[inline]
    #[cfg(test)]
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Oldest node; the eviction candidate.
    #[cfg(test)]
    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    /// Links an unlinked node in at the head.
    pub fn push_front<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let old_head = self.head;
        if let Some(node) = store.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        } else {
            return;
        }
        match old_head.and_then(|h| store.node_mut(h)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    /// Unlinks `id` from the list, wherever it sits.
    ///
    /// `id` must currently be threaded through this list.
    pub fn unlink<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let (prev, next) = match store.node_mut(id) {
            Some(node) => {
                let links = (node.prev, node.next);
                node.unlink();
                links
            }
            None => return,
        };

        match prev.and_then(|p| store.node_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| store.node_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Moves a node already in the list to the head.
    pub fn move_to_front<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        if self.head == Some(id) {
            return;
        }
        self.unlink(store, id);
        self.push_front(store, id);
    }

    /// Unlinks and returns the tail, or `None` if the list is empty.
    pub fn pop_back<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>) -> Option<NodeId>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let tail = self.tail?;
        self.unlink(store, tail);
        Some(tail)
    }

    /// Walks the list from head to tail.
    pub fn iter<'a, K, V, S>(&self, store: &'a NodeStore<K, V, S>) -> Iter<'a, K, V, S>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        Iter {
            store,
            next: self.head,
        }
    }
}

/// Head-to-tail iterator over node ids.
pub struct Iter<'a, K, V, S> {
    store: &'a NodeStore<K, V, S>,
    next: Option<NodeId>,
}

impl<K: Hash + Eq, V, S: BuildHasher> Iterator for Iter<'_, K, V, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.store.node(id).and_then(|node| node.next);
        Some(id)
    }
}

impl<K, V, S> core::fmt::Debug for Iter<'_, K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Iter").field("next", &self.next).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CacheNode;
    use crate::store::DefaultHashBuilder;

    fn setup(keys: &[&'static str]) -> (NodeStore<&'static str, u32>, Vec<NodeId>) {
        let mut store =
            NodeStore::with_capacity_and_hasher(keys.len(), DefaultHashBuilder::default());
        let ids = keys
            .iter()
            .map(|k| store.insert(CacheNode::new(*k, 0, 1)))
            .collect();
        (store, ids)
    }

    fn keys(list: &List, store: &NodeStore<&'static str, u32>) -> Vec<&'static str> {
        list.iter(store)
            .map(|id| store.node(id).unwrap().key)
            .collect()
    }

    #[test]
    fn test_push_front_orders_by_recency() {
        let (mut store, ids) = setup(&["k1", "k2", "k3"]);
        let mut list = List::new();
        for id in &ids {
            list.push_front(&mut store, *id);
        }
        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list, &store), ["k3", "k2", "k1"]);
        assert_eq!(list.head(), Some(ids[2]));
        assert_eq!(list.tail(), Some(ids[0]));
    }

    #[test]
    fn test_move_to_front() {
        let (mut store, ids) = setup(&["k1", "k2", "k3"]);
        let mut list = List::new();
        for id in &ids {
            list.push_front(&mut store, *id);
        }

        list.move_to_front(&mut store, ids[1]);
        assert_eq!(keys(&list, &store), ["k2", "k3", "k1"]);

        list.move_to_front(&mut store, ids[0]);
        assert_eq!(keys(&list, &store), ["k1", "k2", "k3"]);

        // Moving the head is a no-op
        list.move_to_front(&mut store, ids[0]);
        assert_eq!(keys(&list, &store), ["k1", "k2", "k3"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_unlink_middle_head_and_tail() {
        let (mut store, ids) = setup(&["a", "b", "c", "d"]);
        let mut list = List::new();
        for id in &ids {
            list.push_front(&mut store, *id);
        }
        // d, c, b, a
        list.unlink(&mut store, ids[2]);
        assert_eq!(keys(&list, &store), ["d", "b", "a"]);
        list.unlink(&mut store, ids[3]);
        assert_eq!(keys(&list, &store), ["b", "a"]);
        list.unlink(&mut store, ids[0]);
        assert_eq!(keys(&list, &store), ["b"]);
        assert_eq!(list.head(), list.tail());

        let node = store.node(ids[2]).unwrap();
        assert_eq!((node.prev(), node.next()), (None, None));
    }

    #[test]
    fn test_pop_back_until_empty() {
        let (mut store, ids) = setup(&["a", "b"]);
        let mut list = List::new();
        list.push_front(&mut store, ids[0]);
        list.push_front(&mut store, ids[1]);

        assert_eq!(list.pop_back(&mut store), Some(ids[0]));
        assert_eq!(list.pop_back(&mut store), Some(ids[1]));
        assert_eq!(list.pop_back(&mut store), None);
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
    }
}
