//! # redb-backed Durable Store
//!
//! A disk-backed key-value store using the redb embedded database.
//!
//! redb provides:
//! - ACID transactions (a failed write never leaves a torn entry)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Each `set` and `delete` is its own write transaction. Cache entries are
//! independent, so there is nothing to batch.

use super::DurableStore;
use crate::DexError;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table for all cache keys: key string -> encoded entry bytes.
const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// A disk-backed durable store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DexError> {
        let db = Database::create(path.as_ref()).map_err(|e| DexError::Storage(e.to_string()))?;

        // Initialize the table so read transactions never see it missing
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| DexError::Storage(e.to_string()))?;
            let _ = write_txn
                .open_table(ENTRIES)
                .map_err(|e| DexError::Storage(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| DexError::Storage(e.to_string()))?;
        }

        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), DexError> {
        self.db
            .compact()
            .map_err(|e| DexError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl DurableStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DexError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DexError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| DexError::Storage(e.to_string()))?;

        Ok(table
            .get(key)
            .map_err(|e| DexError::Storage(e.to_string()))?
            .map(|data| data.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), DexError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| DexError::StorageWrite(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(ENTRIES)
                .map_err(|e| DexError::StorageWrite(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| DexError::StorageWrite(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| DexError::StorageWrite(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), DexError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| DexError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(ENTRIES)
                .map_err(|e| DexError::Storage(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| DexError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| DexError::Storage(e.to_string()))?;
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, DexError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DexError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| DexError::Storage(e.to_string()))?;

        let mut keys = Vec::new();
        for entry in table.iter().map_err(|e| DexError::Storage(e.to_string()))? {
            let (key, _) = entry.map_err(|e| DexError::Storage(e.to_string()))?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DexError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DexError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| DexError::Storage(e.to_string()))?;

        // Keys are ordered, so the prefix block is contiguous from `prefix`.
        let mut keys = Vec::new();
        for entry in table
            .range(prefix..)
            .map_err(|e| DexError::Storage(e.to_string()))?
        {
            let (key, _) = entry.map_err(|e| DexError::Storage(e.to_string()))?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn set_and_get() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("cache.redb")).expect("open db");

        store.set("pokemon_cache_v1_1", b"payload").expect("set");
        assert_eq!(
            store.get("pokemon_cache_v1_1").expect("get"),
            Some(b"payload".to_vec())
        );
        assert_eq!(store.get("pokemon_cache_v1_2").expect("get"), None);
    }

    #[test]
    fn delete_removes_key() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("cache.redb")).expect("open db");

        store.set("k", b"v").expect("set");
        store.delete("k").expect("delete");
        assert_eq!(store.get("k").expect("get"), None);
        store.delete("k").expect("delete absent");
    }

    #[test]
    fn prefix_scan_stops_at_block_end() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("cache.redb")).expect("open db");

        store.set("a_other", b"x").expect("set");
        store.set("pokemon_cache_v1_1", b"x").expect("set");
        store.set("pokemon_cache_v1_25", b"x").expect("set");
        store.set("pokemon_cache_v2_1", b"x").expect("set");

        let keys = store.keys_with_prefix("pokemon_cache_v1").expect("keys");
        assert_eq!(keys, vec!["pokemon_cache_v1_1", "pokemon_cache_v1_25"]);
        assert_eq!(store.list_keys().expect("keys").len(), 4);
    }

    #[test]
    fn entries_persist_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("cache.redb");

        {
            let store = RedbStore::open(&db_path).expect("open db");
            store.set("k", b"persisted").expect("set");
        }

        {
            let mut store = RedbStore::open(&db_path).expect("reopen db");
            store.compact().expect("compact");
            assert_eq!(store.get("k").expect("get"), Some(b"persisted".to_vec()));
        }
    }
}
