//! Memoization store abstraction over both engines

use std::hash::Hash;

use crate::lru::KeyedCache;
use crate::splay::AdjustingTree;

/// A key/value store usable as a memo table.
///
/// Lookups may reorganize the store (recency refresh, splaying), hence
/// `&mut self`.
pub trait MemoStore<K, V> {
    /// Return the memoized value for `key`, if any
    fn lookup(&mut self, key: &K) -> Option<V>;

    /// Record `value` for `key`
    fn store(&mut self, key: K, value: V);
}

impl<K, V> MemoStore<K, V> for AdjustingTree<K, V>
where
    K: Ord,
    V: Clone,
{
    fn lookup(&mut self, key: &K) -> Option<V> {
        self.search(key).cloned()
    }

    fn store(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K, V> MemoStore<K, V> for KeyedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn lookup(&mut self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn store(&mut self, key: K, value: V) {
        self.put(key, value);
    }
}
