// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process LRU store.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

use lru::LruCache;

use super::KeyValueStore;
use crate::error::{ArianeeError, ArianeeResult};

/// Capacity used by [`InMemoryStore::default`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Bounded in-memory store. Least recently used keys are dropped first.
pub struct InMemoryStore {
    entries: Mutex<LruCache<String, String>>,
}

impl InMemoryStore {
    /// Create a store holding at most `capacity` keys (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Process-wide default instance.
    ///
    /// Only use this when no store is injected; every caller of this
    /// function shares the same entries.
    pub fn shared() -> Arc<InMemoryStore> {
        static SHARED: OnceLock<Arc<InMemoryStore>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(InMemoryStore::default()))
            .clone()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> ArianeeResult<std::sync::MutexGuard<'_, LruCache<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ArianeeError::Store("in-memory store lock poisoned".to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> ArianeeResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> ArianeeResult<()> {
        self.lock()?.put(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> ArianeeResult<()> {
        self.lock()?.pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = InMemoryStore::new(4);
        assert!(store.get("a").unwrap().is_none());

        store.set("a", "1".into()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.set("a", "2".into()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
        store.remove("a").unwrap();
    }

    #[test]
    fn evicts_least_recently_used() {
        let store = InMemoryStore::new(2);
        store.set("a", "1".into()).unwrap();
        store.set("b", "2".into()).unwrap();
        // touch "a" so "b" is the eviction candidate
        store.get("a").unwrap();
        store.set("c", "3".into()).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("b").unwrap().is_none());
        assert!(store.get("a").unwrap().is_some());
        assert!(store.get("c").unwrap().is_some());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let store = InMemoryStore::new(0);
        store.set("a", "1".into()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn shared_instance_is_shared() {
        let a = InMemoryStore::shared();
        let b = InMemoryStore::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
