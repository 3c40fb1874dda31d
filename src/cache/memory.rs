use std::sync::Arc;

use dashmap::DashMap;

use super::CacheDriver;
use crate::error::CacheError;

/// Process-local cache driver.
///
/// Clones share the same store, so a handle given to one middleware instance
/// and kept by the caller observe the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Arc<[u8]>>>,
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheDriver for MemoryCache {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).map(|v| v.value().to_vec()))
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), Arc::from(value));
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let count = self.entries.len();
        self.entries.clear();
        Ok(count)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let cache = MemoryCache::new();
        let handle = cache.clone();
        cache.save("k", b"v").unwrap();
        assert_eq!(handle.fetch("k").unwrap().as_deref(), Some(&b"v"[..]));
        assert!(handle.contains("k").unwrap());
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = MemoryCache::new();
        cache.save("b", b"2").unwrap();
        cache.save("a", b"1").unwrap();
        assert_eq!(cache.keys().unwrap(), vec!["a", "b"]);
        assert!(cache.delete("a").unwrap());
        assert!(!cache.delete("a").unwrap());
        assert_eq!(cache.clear().unwrap(), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.fetch("b").unwrap(), None);
    }
}
