//! Per-key counters with O(1) access to a least and a most frequent key.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::utils::slotvec::{SlotId, SlotVec};

struct Bucket<K> {
    count: u64,
    keys: HashSet<K>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Frequency tracker: keys sharing a count share a bucket, and the buckets
/// form a doubly linked list in ascending count order, bounded by two
/// permanent sentinel buckets. Increment, decrement and min/max retrieval
/// are all O(1).
pub struct FreqList<K> {
    buckets: SlotVec<Bucket<K>>,
    head: SlotId,
    tail: SlotId,
    index: HashMap<K, SlotId>,
}

impl<K: Eq + Hash + Clone> FreqList<K> {
    pub fn new() -> Self {
        let mut buckets = SlotVec::new();
        let head = buckets.insert(Bucket {
            count: 0,
            keys: HashSet::new(),
            prev: None,
            next: None,
        });
        let tail = buckets.insert(Bucket {
            count: u64::MAX,
            keys: HashSet::new(),
            prev: Some(head),
            next: None,
        });
        buckets[head].next = Some(tail);
        Self {
            buckets,
            head,
            tail,
            index: HashMap::new(),
        }
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current count of `key`, zero when untracked.
    pub fn count_of(&self, key: &K) -> u64 {
        self.index
            .get(key)
            .map_or(0, |&slot| self.buckets[slot].count)
    }

    /// Bumps the count of `key` by one, tracking it at count 1 when new.
    pub fn increment(&mut self, key: K) {
        match self.index.get(&key).copied() {
            None => {
                let slot = self.bucket_after(self.head, 1);
                self.buckets[slot].keys.insert(key.clone());
                self.index.insert(key, slot);
            }
            Some(cur) => {
                let count = self.buckets[cur].count;
                self.buckets[cur].keys.remove(&key);
                let slot = self.bucket_after(cur, count + 1);
                self.buckets[slot].keys.insert(key.clone());
                self.index.insert(key, slot);
                self.drop_if_empty(cur);
            }
        }
    }

    /// Drops the count of `key` by one; a count of one stops tracking the
    /// key, an untracked key is left alone.
    pub fn decrement(&mut self, key: &K) {
        let Some(cur) = self.index.get(key).copied() else {
            return;
        };
        let count = self.buckets[cur].count;
        self.buckets[cur].keys.remove(key);
        if count > 1 {
            let slot = self.bucket_before(cur, count - 1);
            self.buckets[slot].keys.insert(key.clone());
            self.index.insert(key.clone(), slot);
        } else {
            self.index.remove(key);
        }
        self.drop_if_empty(cur);
    }

    /// Some key with the lowest count, if any key is tracked.
    pub fn min_key(&self) -> Option<&K> {
        if self.index.is_empty() {
            return None;
        }
        let first = self.buckets[self.head].next?;
        self.buckets[first].keys.iter().next()
    }

    /// Some key with the highest count, if any key is tracked.
    pub fn max_key(&self) -> Option<&K> {
        if self.index.is_empty() {
            return None;
        }
        let last = self.buckets[self.tail].prev?;
        self.buckets[last].keys.iter().next()
    }

    /// Bucket holding `count` directly after `at`, splicing in a fresh one
    /// when the neighbor holds a different count.
    fn bucket_after(&mut self, at: SlotId, count: u64) -> SlotId {
        let next = self.buckets[at].next.expect("tail sentinel bounds the list");
        if next != self.tail && self.buckets[next].count == count {
            return next;
        }
        let id = self.buckets.insert(Bucket {
            count,
            keys: HashSet::new(),
            prev: Some(at),
            next: Some(next),
        });
        self.buckets[at].next = Some(id);
        self.buckets[next].prev = Some(id);
        id
    }

    /// Mirror of `bucket_after` on the lesser side.
    fn bucket_before(&mut self, at: SlotId, count: u64) -> SlotId {
        let prev = self.buckets[at].prev.expect("head sentinel bounds the list");
        if prev != self.head && self.buckets[prev].count == count {
            return prev;
        }
        let id = self.buckets.insert(Bucket {
            count,
            keys: HashSet::new(),
            prev: Some(prev),
            next: Some(at),
        });
        self.buckets[prev].next = Some(id);
        self.buckets[at].prev = Some(id);
        id
    }

    fn drop_if_empty(&mut self, id: SlotId) {
        if id == self.head || id == self.tail || !self.buckets[id].keys.is_empty() {
            return;
        }
        let (prev, next) = {
            let bucket = &self.buckets[id];
            (bucket.prev, bucket.next)
        };
        if let Some(p) = prev {
            self.buckets[p].next = next;
        }
        if let Some(n) = next {
            self.buckets[n].prev = prev;
        }
        self.buckets.remove(id);
    }
}

impl<K: Eq + Hash + Clone> Default for FreqList<K> {
    fn default() -> Self {
        Self::new()
    }
}
