// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pluggable key-value stores.
//!
//! The access-token cache and the fetch-response cache are the only mutable
//! shared state in the SDK. Both are written against [`KeyValueStore`] so
//! callers choose the backend:
//!
//! - [`InMemoryStore`]: bounded LRU, lost on restart
//! - [`RedbStore`]: embedded redb database file
//!
//! Entries carrying a time-to-live are evicted lazily by the reader.

pub mod memory;
pub mod redb_store;

use std::sync::Arc;

use crate::error::ArianeeResult;

pub use memory::InMemoryStore;
pub use redb_store::RedbStore;

/// String key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when the key is absent.
    fn get(&self, key: &str) -> ArianeeResult<Option<String>>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: String) -> ArianeeResult<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> ArianeeResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> ArianeeResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> ArianeeResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> ArianeeResult<()> {
        (**self).remove(key)
    }
}
