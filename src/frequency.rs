//! Frequency buckets for LFU eviction.
//!
//! `buckets[f]` threads exactly the nodes whose `freq == f`, using the same
//! index links as the recency list. Empty buckets are dropped immediately.
//! `min_freq` names the bucket the next victim comes from.
//!
//! Buckets are kept in a `BTreeMap`, so the next lowest frequency after a
//! bucket empties is the first key rather than a scan over all buckets.
//! When the promoted node was the last one at `min_freq`, `min_freq` simply
//! steps up, because the node itself now sits at `min_freq + 1`.
//!
//! Within a bucket, nodes are ordered by when they joined it; the victim is
//! the oldest member. That tie-break is an implementation detail and callers
//! must not rely on which of several equally-cold entries goes first.

use crate::entry::NodeId;
use crate::list::List;
use crate::store::NodeStore;
use core::hash::{BuildHasher, Hash};
use std::collections::BTreeMap;

/// Frequency-bucketed order structure with a tracked minimum.
#[derive(Debug)]
pub struct FrequencyBuckets {
    buckets: BTreeMap<u64, List>,
    min_freq: u64,
}

impl Default for FrequencyBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyBuckets {
    /// Creates an empty structure.
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            min_freq: 1,
        }
    }

    /// Lowest frequency that currently has a bucket.
    ///
    /// Meaningless while the structure is empty.
    #[cfg(test)]
    pub fn min_freq(&self) -> u64 {
        self.min_freq
    }

    /// Number of non-empty buckets.
    #[cfg(test)]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Frequencies that currently have a bucket, ascending.
    pub fn frequencies(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.keys().copied()
    }

    /// Number of nodes at frequency `freq`.
    #[cfg(test)]
    pub fn bucket_len(&self, freq: u64) -> usize {
        self.buckets.get(&freq).map_or(0, List::len)
    }

    /// Adds a freshly created node (frequency 1).
    pub fn insert_new<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        self.min_freq = 1;
        self.attach(store, id);
    }

    /// Counts an access: moves the node to the bucket for `freq + 1`.
    pub fn promote<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let Some(freq) = store.node(id).map(|node| node.freq) else {
            return;
        };
        if self.detach(store, id, freq) && freq == self.min_freq {
            self.min_freq += 1;
        }
        if let Some(node) = store.node_mut(id) {
            node.freq += 1;
        }
        self.attach(store, id);
    }

    /// Removes a node from its bucket without changing its frequency.
    pub fn remove<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let Some(freq) = store.node(id).map(|node| node.freq) else {
            return;
        };
        if self.detach(store, id, freq) && freq == self.min_freq {
            self.recompute_min();
        }
    }

    /// Unlinks and returns the eviction victim from the `min_freq` bucket.
    pub fn pop_victim<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>) -> Option<NodeId>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        if !self.buckets.contains_key(&self.min_freq) {
            self.recompute_min();
        }
        let freq = self.min_freq;
        let bucket = self.buckets.get_mut(&freq)?;
        let victim = bucket.pop_back(store)?;
        if bucket.is_empty() {
            self.buckets.remove(&freq);
            self.recompute_min();
        }
        Some(victim)
    }

    /// Walks the nodes of bucket `freq`, newest first.
    pub fn iter_bucket<'a, K, V, S>(
        &self,
        store: &'a NodeStore<K, V, S>,
        freq: u64,
    ) -> impl Iterator<Item = NodeId> + 'a
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        self.buckets
            .get(&freq)
            .copied()
            .into_iter()
            .flat_map(move |bucket| bucket.iter(store))
    }

    fn attach<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let Some(freq) = store.node(id).map(|node| node.freq) else {
            return;
        };
        self.buckets
            .entry(freq)
            .or_default()
            .push_front(store, id);
    }

    /// Unlinks `id` from bucket `freq`; returns `true` if the bucket emptied.
    fn detach<K, V, S>(&mut self, store: &mut NodeStore<K, V, S>, id: NodeId, freq: u64) -> bool
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return false;
        };
        bucket.unlink(store, id);
        if bucket.is_empty() {
            self.buckets.remove(&freq);
            true
        } else {
            false
        }
    }

    fn recompute_min(&mut self) {
        self.min_freq = self.buckets.keys().next().copied().unwrap_or(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CacheNode;
    use crate::store::DefaultHashBuilder;

    type Setup = (NodeStore<&'static str, u32>, FrequencyBuckets, Vec<NodeId>);

    fn setup(keys: &[&'static str]) -> Setup {
        let mut store =
            NodeStore::with_capacity_and_hasher(keys.len(), DefaultHashBuilder::default());
        let mut buckets = FrequencyBuckets::new();
        let ids = keys
            .iter()
            .map(|k| {
                let id = store.insert(CacheNode::new(*k, 0, 1));
                buckets.insert_new(&mut store, id);
                id
            })
            .collect();
        (store, buckets, ids)
    }

    fn freq(store: &NodeStore<&'static str, u32>, id: NodeId) -> u64 {
        store.node(id).unwrap().freq
    }

    #[test]
    fn test_promote_moves_between_buckets() {
        let (mut store, mut buckets, ids) = setup(&["k1", "k2", "k3"]);
        assert_eq!(buckets.bucket_len(1), 3);

        buckets.promote(&mut store, ids[1]);
        buckets.promote(&mut store, ids[0]);
        buckets.promote(&mut store, ids[1]);

        assert_eq!(freq(&store, ids[0]), 2);
        assert_eq!(freq(&store, ids[1]), 3);
        assert_eq!(freq(&store, ids[2]), 1);
        assert_eq!(buckets.bucket_len(1), 1);
        assert_eq!(buckets.bucket_len(2), 1);
        assert_eq!(buckets.bucket_len(3), 1);
        assert_eq!(buckets.min_freq(), 1);
        assert_eq!(buckets.frequencies().collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn test_min_freq_steps_up_when_last_min_node_is_promoted() {
        let (mut store, mut buckets, ids) = setup(&["a"]);
        buckets.promote(&mut store, ids[0]);
        assert_eq!(buckets.min_freq(), 2);
        assert_eq!(buckets.bucket_count(), 1);
    }

    #[test]
    fn test_victim_is_lowest_frequency() {
        let (mut store, mut buckets, ids) = setup(&["k1", "k2", "k3"]);
        buckets.promote(&mut store, ids[1]);
        buckets.promote(&mut store, ids[0]);
        buckets.promote(&mut store, ids[1]);

        assert_eq!(buckets.pop_victim(&mut store), Some(ids[2]));
        // Bucket 1 is gone; the next victim comes from frequency 2
        assert_eq!(buckets.min_freq(), 2);
        assert_eq!(buckets.pop_victim(&mut store), Some(ids[0]));
        assert_eq!(buckets.pop_victim(&mut store), Some(ids[1]));
        assert_eq!(buckets.pop_victim(&mut store), None);
    }

    #[test]
    fn test_victim_tie_break_is_oldest_in_bucket() {
        let (mut store, mut buckets, ids) = setup(&["a", "b", "c"]);
        assert_eq!(buckets.pop_victim(&mut store), Some(ids[0]));
        assert_eq!(buckets.pop_victim(&mut store), Some(ids[1]));
    }

    #[test]
    fn test_remove_recomputes_min() {
        let (mut store, mut buckets, ids) = setup(&["a", "b"]);
        buckets.promote(&mut store, ids[1]);
        buckets.promote(&mut store, ids[1]);
        assert_eq!(buckets.min_freq(), 1);

        buckets.remove(&mut store, ids[0]);
        assert_eq!(buckets.min_freq(), 3);
        assert_eq!(buckets.pop_victim(&mut store), Some(ids[1]));
    }

    #[test]
    fn test_insert_new_resets_min() {
        let (mut store, mut buckets, ids) = setup(&["a"]);
        buckets.promote(&mut store, ids[0]);
        assert_eq!(buckets.min_freq(), 2);

        let b = store.insert(CacheNode::new("b", 0, 1));
        buckets.insert_new(&mut store, b);
        assert_eq!(buckets.min_freq(), 1);
        assert_eq!(buckets.iter_bucket(&store, 1).collect::<Vec<_>>(), [b]);
    }

    #[test]
    fn test_min_freq_after_many_distinct_frequencies() {
        let keys: Vec<&'static str> = vec!["a", "b", "c", "d", "e"];
        let (mut store, mut buckets, ids) = setup(&keys);
        // a=1 b=2 c=3 d=4 e=5
        for (i, id) in ids.iter().enumerate() {
            for _ in 0..i {
                buckets.promote(&mut store, *id);
            }
        }
        assert_eq!(buckets.bucket_count(), 5);

        buckets.remove(&mut store, ids[0]);
        assert_eq!(buckets.min_freq(), 2);
        buckets.remove(&mut store, ids[2]);
        assert_eq!(buckets.min_freq(), 2);
        assert_eq!(buckets.pop_victim(&mut store), Some(ids[1]));
        assert_eq!(buckets.min_freq(), 4);
        assert_eq!(buckets.frequencies().collect::<Vec<_>>(), [4, 5]);
    }
}
