//! Generation-stamped key/value cache with incremental snapshot updates.
//!
//! A [`ListStore`] is the live cache: every set stamps the value with the
//! next generation and moves it to the front of a recency list. A
//! [`RawStore`] is a flat snapshot of that cache carrying a generation
//! watermark. Updating the snapshot walks the cache newest-first and stops
//! at the first entry the snapshot has already seen, so the cost is
//! proportional to what changed, not to the cache size.

use std::collections::{HashMap, HashSet};

use crate::linkmap::LinkedMap;

/// Implemented by values whose freshness is tracked with a monotonically
/// increasing generation stamp.
pub trait Generational {
    fn generation(&self) -> u64;
    fn set_generation(&mut self, generation: u64);
}

/// Live cache side: recency-ordered store stamping each set value with the
/// next generation.
pub struct ListStore<V> {
    items: LinkedMap<String, V>,
    generation: u64,
}

impl<V: Generational> ListStore<V> {
    pub fn new() -> Self {
        Self {
            items: LinkedMap::new(),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Generation handed out by the most recent set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.items.get(key)
    }

    /// Stores `value` under `key`, stamping it with the next generation and
    /// moving it to the front of the recency list.
    pub fn set(&mut self, key: impl Into<String>, mut value: V) {
        self.generation += 1;
        value.set_generation(self.generation);
        self.items.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.items.remove(key)
    }

    /// Entries from most to least recently set, which is also descending
    /// generation order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.items.iter()
    }

    /// Brings `snapshot` up to date with this cache.
    ///
    /// Cache entries newer than the snapshot's watermark are copied through
    /// `clone_value`, newest first, stopping at the first entry the snapshot
    /// already covers. Keys the snapshot itself touched since the last
    /// update are replayed from the cache, then keys no longer present in
    /// the cache are pruned and the watermark advances.
    pub fn update_snapshot(&self, snapshot: &mut RawStore<V>, mut clone_value: impl FnMut(&V) -> V) {
        let watermark = snapshot.generation();
        for (key, value) in self.iter() {
            if value.generation() <= watermark {
                break;
            }
            snapshot.store.insert(key.clone(), clone_value(value));
        }
        for key in snapshot.take_dirty() {
            match self.items.get(key.as_str()) {
                Some(value) => {
                    snapshot.store.insert(key, clone_value(value));
                }
                None => {
                    snapshot.store.remove(&key);
                }
            }
        }
        snapshot.generation = self.generation;
        if snapshot.store.len() != self.items.len() {
            let items = &self.items;
            snapshot.store.retain(|key, _| items.get(key.as_str()).is_some());
        }
    }
}

impl<V: Generational> Default for ListStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot side: flat map with a generation watermark, remembering which
/// keys were mutated directly so the next update can replay them from the
/// cache.
pub struct RawStore<V> {
    store: HashMap<String, V>,
    generation: u64,
    dirty: HashSet<String>,
}

impl<V> RawStore<V> {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            generation: 0,
            dirty: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Watermark: the cache generation this snapshot has fully absorbed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.store.get(key)
    }

    /// Stores `value` directly in the snapshot, marking the key dirty.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        self.dirty.insert(key.clone());
        self.store.insert(key, value);
    }

    /// Removes a snapshot entry directly, marking the key dirty.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.dirty.insert(key.to_string());
        self.store.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.store.iter()
    }

    fn take_dirty(&mut self) -> HashSet<String> {
        std::mem::take(&mut self.dirty)
    }
}

impl<V> Default for RawStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
