//! Hash-to-integer identifier allocation.

use std::collections::HashMap;
use std::hash::Hash;

/// Hands out one stable `u64` id per distinct key, with reverse lookup.
/// Ids start at zero and are never reused.
pub struct IdMap<K> {
    ids: HashMap<K, u64>,
    keys: HashMap<u64, K>,
    next: u64,
}

impl<K: Eq + Hash + Clone> IdMap<K> {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            keys: HashMap::new(),
            next: 0,
        }
    }

    /// Id of `key`, allocating the next one on first sight.
    pub fn id_of(&mut self, key: K) -> u64 {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.next;
        self.next += 1;
        self.keys.insert(id, key.clone());
        self.ids.insert(key, id);
        id
    }

    /// Key behind an id handed out earlier.
    pub fn lookup(&self, id: u64) -> Option<&K> {
        self.keys.get(&id)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.ids.contains_key(key)
    }

    /// Number of ids handed out.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for IdMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::IdMap;

    #[test]
    fn ids_are_stable_and_dense() {
        let mut ids = IdMap::new();
        assert!(ids.is_empty());
        let a = ids.id_of("a");
        let b = ids.id_of("b");
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(ids.id_of("a"), a);
        assert_eq!(ids.len(), 2);

        assert!(ids.contains(&"a"));
        assert!(!ids.contains(&"z"));
        assert_eq!(ids.lookup(a), Some(&"a"));
        assert_eq!(ids.lookup(99), None);
    }
}
