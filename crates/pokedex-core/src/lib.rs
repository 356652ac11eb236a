//! # pokedex-core
//!
//! The deterministic catalog engine for Pokedex - THE LOGIC.
//!
//! This crate turns species records into a locally queryable collection:
//! - `types` / `generation`: the record model and the fixed id bands
//! - `source`: the remote payload schema and pure record assembly
//! - `storage`: the two-tier TTL record cache over a durable key-value store
//! - `fuzzy` / `query`: typo-tolerant search and the filter/sort pipeline
//! - `collection`: the state container the presentation layer reads
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - BTreeMap only, integer arithmetic only
//! - Emits `tracing` events but never installs a subscriber
//! - The network half of record acquisition lives in the `pokedex` app

// =============================================================================
// MODULES
// =============================================================================

pub mod collection;
pub mod display;
pub mod fuzzy;
pub mod generation;
pub mod primitives;
pub mod query;
pub mod source;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    DexError, LegendaryStatus, Pokemon, PokemonId, PokemonType, Sprites, StatKind, Stats, Tenths,
    TypeSet,
};

// =============================================================================
// RE-EXPORTS: Catalog Engine
// =============================================================================

pub use collection::{CollectionState, Neighbor, Siblings};
pub use fuzzy::SearchOptions;
pub use generation::{GENERATION_BANDS, Generation, Region};
pub use query::{FilterSpec, SortDirection, SortKey, derive_view, derive_view_with};
pub use source::{PokemonPayload, SpeciesPayload, assemble};

// =============================================================================
// RE-EXPORTS: Storage (from storage module)
// =============================================================================

pub use storage::{
    CacheEntry, CacheStats, Clock, DurableStore, ManualClock, MemoryStore, RecordStore, RedbStore,
    SystemClock,
};
