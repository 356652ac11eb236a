//! # Record Store
//!
//! Two-tier record cache: an in-memory map in front of a durable key-value
//! store, every entry stamped with the time it was fetched.
//!
//! - An entry is valid iff `now - fetched_at <= ttl`
//! - Expired entries read as absent and are purged on that read
//! - Durable writes are best effort: a failed write is logged and counted,
//!   and the record stays valid in memory for the session
//!
//! All durable keys live under `"{CACHE_KEY_PREFIX}_"`.

use super::{DurableStore, MemoryStore};
use crate::primitives::{CACHE_KEY_PREFIX, CACHE_TTL_MS};
use crate::{DexError, Pokemon, PokemonId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// CLOCK
// =============================================================================

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock for expiry tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Start at the given instant.
    #[must_use]
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(now_ms),
        }
    }

    /// Move time forward.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// =============================================================================
// ENTRIES & STATS
// =============================================================================

/// A cached record and the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Pokemon,
    pub timestamp: u64,
}

impl CacheEntry {
    /// Encode for the durable store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DexError> {
        postcard::to_stdvec(self).map_err(|e| DexError::Serialization(e.to_string()))
    }

    /// Decode from the durable store.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DexError> {
        postcard::from_bytes(bytes).map_err(|e| DexError::Serialization(e.to_string()))
    }

    fn is_fresh(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) <= ttl_ms
    }
}

/// Cache occupancy counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Records in the in-memory map.
    pub memory_count: usize,
    /// Keys under this cache's durable namespace.
    pub durable_count: usize,
    /// Durable writes that failed since the store was created.
    pub write_failures: u64,
}

// =============================================================================
// RECORD STORE
// =============================================================================

/// Two-tier record cache keyed by record id.
///
/// All methods take `&self`; the store is shared by concurrent fetches.
/// Writes are idempotent by id, so last-write-wins needs no extra locking.
pub struct RecordStore {
    memory: RwLock<BTreeMap<PokemonId, CacheEntry>>,
    durable: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
    write_failures: AtomicU64,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("memory_count", &self.read_memory().len())
            .field("ttl_ms", &self.ttl_ms)
            .field("write_failures", &self.write_failures.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Create a store over a durable backend, using the wall clock.
    pub fn new(durable: Arc<dyn DurableStore>) -> Self {
        Self::with_clock(durable, Arc::new(SystemClock))
    }

    /// Create a store with an explicit clock.
    pub fn with_clock(durable: Arc<dyn DurableStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: RwLock::new(BTreeMap::new()),
            durable,
            clock,
            ttl_ms: CACHE_TTL_MS,
            write_failures: AtomicU64::new(0),
        }
    }

    /// Create a store whose durable tier is volatile.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Durable key of a record.
    #[must_use]
    pub fn key(id: PokemonId) -> String {
        format!("{}_{}", CACHE_KEY_PREFIX, id.0)
    }

    fn namespace() -> String {
        format!("{}_", CACHE_KEY_PREFIX)
    }

    fn read_memory(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<PokemonId, CacheEntry>> {
        self.memory.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_memory(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<PokemonId, CacheEntry>> {
        self.memory.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Look a record up: memory first, then durable storage.
    ///
    /// A valid durable hit is promoted into memory. Expired entries are
    /// purged from both tiers and read as absent.
    pub fn get(&self, id: PokemonId) -> Option<Pokemon> {
        let now = self.clock.now_ms();

        let memory_hit = self.read_memory().get(&id).cloned();
        if let Some(entry) = memory_hit {
            if entry.is_fresh(now, self.ttl_ms) {
                tracing::debug!(id = id.0, "cache hit (memory)");
                return Some(entry.data);
            }
            self.write_memory().remove(&id);
            self.evict_durable(id);
            tracing::debug!(id = id.0, "cache entry expired (memory)");
            return None;
        }

        let key = Self::key(id);
        let bytes = match self.durable.get(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(id = id.0, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(id = id.0, error = %e, "durable cache read failed");
                return None;
            }
        };

        let entry = match CacheEntry::from_bytes(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(id = id.0, error = %e, "undecodable cache entry dropped");
                self.evict_durable(id);
                return None;
            }
        };

        if !entry.is_fresh(now, self.ttl_ms) {
            tracing::debug!(id = id.0, "cache entry expired (durable)");
            self.evict_durable(id);
            return None;
        }

        tracing::debug!(id = id.0, "cache hit (durable)");
        let record = entry.data.clone();
        self.write_memory().insert(id, entry);
        Some(record)
    }

    /// Store a record in memory and, best effort, in durable storage.
    pub fn put(&self, record: Pokemon) {
        let entry = CacheEntry {
            data: record,
            timestamp: self.clock.now_ms(),
        };
        let id = entry.data.id;

        if let Err(e) = self.persist(&entry) {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                id = id.0,
                error = %e,
                "failed to persist record; keeping it in memory only"
            );
        }

        self.write_memory().insert(id, entry);
    }

    fn persist(&self, entry: &CacheEntry) -> Result<(), DexError> {
        let bytes = entry
            .to_bytes()
            .map_err(|e| DexError::StorageWrite(e.to_string()))?;
        self.durable.set(&Self::key(entry.data.id), &bytes)
    }

    fn evict_durable(&self, id: PokemonId) {
        if let Err(e) = self.durable.delete(&Self::key(id)) {
            tracing::warn!(id = id.0, error = %e, "failed to evict cache entry");
        }
    }

    /// Empty the memory map and delete every durable key in this namespace.
    pub fn clear(&self) {
        self.write_memory().clear();

        let keys = match self.durable.keys_with_prefix(&Self::namespace()) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list durable cache keys");
                return;
            }
        };
        for key in keys {
            if let Err(e) = self.durable.delete(&key) {
                tracing::warn!(key = %key, error = %e, "failed to delete cache key");
            }
        }
    }

    /// Occupancy of both tiers.
    pub fn stats(&self) -> CacheStats {
        let durable_count = self
            .durable
            .keys_with_prefix(&Self::namespace())
            .map(|keys| keys.len())
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to count durable cache keys");
                0
            });

        CacheStats {
            memory_count: self.read_memory().len(),
            durable_count,
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
