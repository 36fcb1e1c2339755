//! Bounded LRU cache used by the parse, validation, property and
//! template caches.
//!
//! Backed by an `IndexMap` kept in recency order: a hit moves the entry
//! to the back, an insert past capacity evicts exactly one entry from the
//! front. Contents are advisory — callers must tolerate eviction at any
//! moment.

use std::hash::Hash;

use indexmap::IndexMap;

pub struct LruCache<K, V> {
    entries: IndexMap<K, V>,
    capacity: usize,
}

impl<K: Eq + Hash, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch and mark as most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let index = self.entries.get_index_of(key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, v)| v)
    }

    /// Insert, evicting the single oldest entry when over capacity.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(index) = self.entries.get_index_of(&key) {
            if let Some((_, slot)) = self.entries.get_index_mut(index) {
                *slot = value;
            }
            let last = self.entries.len() - 1;
            self.entries.move_index(index, last);
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_single_oldest_entry() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&"a").is_none());
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn get_refreshes_recency() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.get(&"a");
        cache.insert("c", 3);
        // "b" was the least recently used
        assert!(cache.get(&"b").is_none());
        assert_eq!(cache.get(&"a"), Some(&1));
    }

    #[test]
    fn reinsert_updates_without_eviction() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(&10));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut cache = LruCache::new(0);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(&1));
    }
}
