//! # Collection Module
//!
//! The state container behind the catalog: the full record set, the active
//! filter specification and the loading/error flags.
//!
//! Records are held behind an `Arc` snapshot. Merges build a new map and swap
//! it in whole, so a reader holding a snapshot never observes a half-applied
//! merge. The derived view is computed on demand from the current snapshot.

use crate::fuzzy::SearchOptions;
use crate::query::{FilterSpec, SortKey, derive_view_with};
use crate::{Generation, Pokemon, PokemonId, PokemonType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An `(id, name)` pair used for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: PokemonId,
    pub name: String,
}

impl Neighbor {
    fn of(record: &Pokemon) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
        }
    }
}

/// Previous, current and next records around one id in the derived view.
///
/// Navigation wraps: the first record's `prev` is the last record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Siblings {
    pub prev: Neighbor,
    pub current: Neighbor,
    pub next: Neighbor,
}

/// Process-wide catalog state. Created empty, mutated by merges and filter
/// changes.
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    records: Arc<BTreeMap<PokemonId, Pokemon>>,
    filters: FilterSpec,
    is_loading: bool,
    last_error: Option<String>,
    search_options: SearchOptions,
}

impl CollectionState {
    /// Create an empty collection with default search options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with custom search options.
    #[must_use]
    pub fn with_search_options(search_options: SearchOptions) -> Self {
        Self {
            search_options,
            ..Self::default()
        }
    }

    // =========================================================================
    // MERGES
    // =========================================================================

    /// Replace the whole collection.
    pub fn set_all(&mut self, records: impl IntoIterator<Item = Pokemon>) {
        let map: BTreeMap<PokemonId, Pokemon> = records.into_iter().map(|p| (p.id, p)).collect();
        self.records = Arc::new(map);
    }

    /// Merge records into the collection, replacing any with the same id.
    ///
    /// Returns the number of records that were not present before.
    pub fn add(&mut self, records: impl IntoIterator<Item = Pokemon>) -> usize {
        let mut next = (*self.records).clone();
        let mut added = 0;
        for record in records {
            if next.insert(record.id, record).is_none() {
                added += 1;
            }
        }
        self.records = Arc::new(next);
        added
    }

    // =========================================================================
    // FLAGS
    // =========================================================================

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Record a non-fatal error. `None` clears it.
    pub fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // =========================================================================
    // FILTER MUTATIONS
    // =========================================================================

    #[must_use]
    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    #[must_use]
    pub fn search_options(&self) -> &SearchOptions {
        &self.search_options
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filters.set_search_query(query);
    }

    pub fn toggle_category(&mut self, tag: PokemonType) {
        self.filters.toggle_category(tag);
    }

    pub fn toggle_generation(&mut self, generation: Generation) {
        self.filters.toggle_generation(generation);
    }

    pub fn set_sort_by(&mut self, key: SortKey) {
        self.filters.set_sort_by(key);
    }

    pub fn toggle_sort_order(&mut self) {
        self.filters.toggle_sort_order();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_filters();
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Look up one record by id.
    #[must_use]
    pub fn get(&self, id: PokemonId) -> Option<&Pokemon> {
        self.records.get(&id)
    }

    /// Number of records in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The current record snapshot. Cheap to clone and safe to read after
    /// the state has moved on.
    #[must_use]
    pub fn snapshot(&self) -> Arc<BTreeMap<PokemonId, Pokemon>> {
        Arc::clone(&self.records)
    }

    /// All records in id order.
    pub fn records(&self) -> impl Iterator<Item = &Pokemon> {
        self.records.values()
    }

    /// The derived view under the active filter specification.
    #[must_use]
    pub fn view(&self) -> Vec<&Pokemon> {
        self.view_with(&self.filters)
    }

    /// The derived view under a one-off filter specification.
    #[must_use]
    pub fn view_with(&self, spec: &FilterSpec) -> Vec<&Pokemon> {
        derive_view_with(self.records.values(), spec, &self.search_options)
    }

    /// Neighbours of `id` in the active derived view, wrapping at both ends.
    ///
    /// Returns `None` when the id is not visible.
    #[must_use]
    pub fn siblings(&self, id: PokemonId) -> Option<Siblings> {
        let view = self.view();
        let pos = view.iter().position(|p| p.id == id)?;
        let len = view.len();
        let prev = view[(pos + len - 1) % len];
        let next = view[(pos + 1) % len];
        Some(Siblings {
            prev: Neighbor::of(prev),
            current: Neighbor::of(view[pos]),
            next: Neighbor::of(next),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
