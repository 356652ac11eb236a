//! # Durable Key-Value Interface
//!
//! The namespaced key-value contract the record store persists through, plus
//! a volatile in-memory implementation.
//!
//! Backends may run out of capacity. A failed `set` reports
//! `DexError::StorageWrite` and leaves the previous value (if any) intact.

use crate::DexError;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A durable, string-keyed byte store.
///
/// Implementations must be `Send + Sync`: concurrent fetches share one store.
pub trait DurableStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DexError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), DexError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), DexError>;

    /// Every key in the store, in ascending order.
    fn list_keys(&self) -> Result<Vec<String>, DexError>;

    /// Keys starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DexError> {
        Ok(self
            .list_keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }
}

// =============================================================================
// IN-MEMORY BACKEND
// =============================================================================

/// Volatile store with an optional byte quota.
///
/// The quota counts key and value bytes, the way browser storage quotas do.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes past `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DexError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), DexError> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            if used + needed > quota {
                return Err(DexError::StorageWrite(format!(
                    "quota exceeded: {} + {} > {} bytes",
                    used, needed, quota
                )));
            }
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), DexError> {
        self.lock().remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, DexError> {
        Ok(self.lock().keys().cloned().collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
