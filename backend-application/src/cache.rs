use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: i64,
}

/// Key -> {value, expiry} map with caller-supplied clock (unix seconds).
/// Entries are live while `now < expires_at`.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, value: V, ttl_seconds: i64, now: i64) {
        let expires_at = now.saturating_add(ttl_seconds.max(0));
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    pub fn get(&self, key: &K, now: i64) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| &entry.value)
    }

    pub fn contains_live(&self, key: &K, now: i64) -> bool {
        self.get(key, now).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drops expired entries and returns how many were removed.
    pub fn purge_expired(&mut self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache = TtlCache::new();
        cache.insert("a", 1, 10, 100);
        assert_eq!(cache.get(&"a", 100), Some(&1));
        assert_eq!(cache.get(&"a", 109), Some(&1));
        assert_eq!(cache.get(&"a", 110), None);
        assert!(!cache.contains_live(&"a", 200));
    }

    #[test]
    fn zero_ttl_is_never_live() {
        let mut cache = TtlCache::new();
        cache.insert("a", (), 0, 100);
        assert!(!cache.contains_live(&"a", 100));
    }

    #[test]
    fn purge_removes_only_expired_entries() {
        let mut cache = TtlCache::new();
        cache.insert("old", 1, 5, 0);
        cache.insert("new", 2, 50, 0);
        assert_eq!(cache.purge_expired(10), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"new", 10), Some(&2));
        assert_eq!(cache.remove(&"new"), Some(2));
        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_refreshes_expiry() {
        let mut cache = TtlCache::new();
        cache.insert("a", 1, 10, 0);
        cache.insert("a", 2, 10, 8);
        assert_eq!(cache.get(&"a", 15), Some(&2));
    }
}
