//! LRU (Least Recently Used) keyed cache
//!
//! Uses an index-linked recency list threaded through a node arena, with an
//! AHash map from key to arena slot. `get` and `put` are O(1); predicate
//! invalidation is O(n) in the number of cached entries.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::stats::CacheStats;

/// Default capacity used by [`KeyedCache::default`]
pub const DEFAULT_CAPACITY: usize = 1000;

/// Node in the recency list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Fixed-capacity LRU cache keyed by arbitrary hashable keys.
///
/// The head of the recency list is the most recently used entry, the tail is
/// the next eviction victim.
pub struct KeyedCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> KeyedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new cache holding at most `capacity` entries
    ///
    /// # Errors
    /// * [`Error::InvalidCapacity`] if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        debug!(capacity, "creating keyed cache");

        Ok(Self::with_valid_capacity(capacity))
    }

    fn with_valid_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
            stats: CacheStats::new(),
        }
    }

    /// Get a value, marking its key most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.map.get(key) {
            Some(&idx) => {
                self.stats.record_hit();
                self.move_to_front(idx);
                self.nodes[idx].as_ref().map(|node| &node.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Get a value without touching recency or statistics
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Check membership without touching recency or statistics
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or overwrite a value, marking its key most recently used.
    ///
    /// If the insert grows the cache past its capacity, the least recently
    /// used entry is evicted and returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
            }
            self.move_to_front(idx);
            return None;
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: self.head,
        });

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }

        self.map.insert(key, idx);
        self.stats.record_insert();

        let evicted = if self.map.len() > self.capacity {
            self.evict()
        } else {
            None
        };

        debug_assert!(self.map.len() <= self.capacity);
        evicted
    }

    /// Remove every entry whose key satisfies `predicate`.
    ///
    /// The predicate runs exactly once per cached entry, before anything is
    /// removed. Returns the number of entries removed.
    pub fn invalidate<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let doomed: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                Some(node) if predicate(&node.key) => Some(idx),
                _ => None,
            })
            .collect();

        for &idx in &doomed {
            self.unlink(idx);
            if let Some(node) = self.nodes[idx].take() {
                self.map.remove(&node.key);
            }
            self.free_node(idx);
        }

        if !doomed.is_empty() {
            debug!(removed = doomed.len(), remaining = self.map.len(), "invalidated cache entries");
        }
        self.stats.record_invalidations(doomed.len());
        doomed.len()
    }

    /// Remove a key from the cache
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.free_node(idx);
        self.nodes[idx].take().map(|node| node.value)
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the fixed capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset cache statistics (entries are kept)
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate keys from least to most recently used
    pub fn keys_lru_order(&self) -> impl Iterator<Item = &K> + '_ {
        let nodes = &self.nodes;
        let mut cursor = self.tail;
        std::iter::from_fn(move || {
            let node = nodes[cursor?].as_ref()?;
            cursor = node.prev;
            Some(&node.key)
        })
    }

    /// Verify that the index and the recency list agree.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.map.len() > self.capacity {
            return Err(format!("{} entries exceed capacity {}", self.map.len(), self.capacity));
        }

        let mut walked = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.nodes[idx]
                .as_ref()
                .ok_or_else(|| format!("list reaches freed slot {}", idx))?;
            if node.prev != prev {
                return Err(format!("slot {} has a stale back link", idx));
            }
            if self.map.get(&node.key) != Some(&idx) {
                return Err(format!("slot {} is not indexed by its key", idx));
            }
            walked += 1;
            if walked > self.map.len() {
                return Err("recency list is longer than the index".to_string());
            }
            prev = cursor;
            cursor = node.next;
        }

        if self.tail != prev {
            return Err("tail does not terminate the recency list".to_string());
        }
        if walked != self.map.len() {
            return Err(format!("list holds {} entries, index holds {}", walked, self.map.len()));
        }
        Ok(())
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let tail_idx = self.tail?;
        self.unlink(tail_idx);
        let node = self.nodes[tail_idx].take()?;
        self.map.remove(&node.key);
        self.free_node(tail_idx);
        self.stats.record_eviction();
        trace!(slot = tail_idx, "evicted least recently used entry");
        Some((node.key, node.value))
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}

impl<K, V> Default for KeyedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::with_valid_capacity(DEFAULT_CAPACITY)
    }
}

impl<K, V> std::fmt::Debug for KeyedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedCache")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}
