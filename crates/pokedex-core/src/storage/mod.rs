//! # Storage Module
//!
//! The record cache and the durable backends it persists through.
//!
//! - `durable`: the `DurableStore` key-value contract and `MemoryStore`
//! - `redb_store`: `RedbStore`, the disk-backed implementation
//! - `record_store`: `RecordStore`, the two-tier TTL cache over either

mod durable;
mod record_store;
mod redb_store;

pub use durable::{DurableStore, MemoryStore};
pub use record_store::{CacheEntry, CacheStats, Clock, ManualClock, RecordStore, SystemClock};
pub use redb_store::RedbStore;
