// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persistent key-value store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `arianee_kv`: key → value (UTF-8 strings)

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

use super::KeyValueStore;
use crate::error::{ArianeeError, ArianeeResult};

const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("arianee_kv");

#[derive(Debug, thiserror::Error)]
enum RedbStoreError {
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),
}

impl From<RedbStoreError> for ArianeeError {
    fn from(err: RedbStoreError) -> Self {
        ArianeeError::Store(err.to_string())
    }
}

/// Embedded store surviving process restarts.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> ArianeeResult<Self> {
        Ok(Self::open_inner(path)?)
    }

    fn open_inner(path: &Path) -> Result<Self, RedbStoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions never see it missing
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn get_inner(&self, key: &str) -> Result<Option<String>, RedbStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES)?;
        Ok(table.get(key)?.map(|value| value.value().to_string()))
    }

    fn set_inner(&self, key: &str, value: &str) -> Result<(), RedbStoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTRIES)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove_inner(&self, key: &str) -> Result<(), RedbStoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTRIES)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> ArianeeResult<Option<String>> {
        Ok(self.get_inner(key)?)
    }

    fn set(&self, key: &str, value: String) -> ArianeeResult<()> {
        Ok(self.set_inner(key, &value)?)
    }

    fn remove(&self, key: &str) -> ArianeeResult<()> {
        Ok(self.remove_inner(key)?)
    }
}
