//! # Query Module
//!
//! The filter specification and the pure view derivation over a collection.
//!
//! Pipeline, in fixed order:
//! 1. Search: empty query passes everything; `#?digits` is an exact id
//!    lookup; anything else goes through the fuzzy matcher
//! 2. Category filter (OR across selected tags)
//! 3. Generation filter (OR across selected generations)
//! 4. Stable sort by the selected key and direction
//!
//! `derive_view` keeps no state between calls. Callers memoize.

use crate::fuzzy::{self, SearchOptions};
use crate::{DexError, Generation, Pokemon, PokemonType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// SORTING
// =============================================================================

/// Sort key of the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    Name,
    #[serde(alias = "stats")]
    StatTotal,
}

impl FromStr for SortKey {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "stats" | "stat_total" | "stat-total" | "total" => Ok(Self::StatTotal),
            other => Err(DexError::Config(format!("unknown sort key '{}'", other))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::StatTotal => "stat_total",
        })
    }
}

/// Sort direction of the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(DexError::Config(format!("unknown sort order '{}'", other))),
        }
    }
}

/// Case-insensitive name ordering, falling back to raw code points on ties.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

fn compare(a: &Pokemon, b: &Pokemon, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Name => collate(&a.name, &b.name),
        SortKey::StatTotal => a.stat_total().cmp(&b.stat_total()),
    }
}

// =============================================================================
// FILTER SPECIFICATION
// =============================================================================

/// User-controlled search, filter and sort settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub category_filters: BTreeSet<PokemonType>,
    pub generation_filters: BTreeSet<Generation>,
    pub search_query: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl FilterSpec {
    /// Default specification: no filters, id ascending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_category(&mut self, tag: PokemonType) {
        if !self.category_filters.remove(&tag) {
            self.category_filters.insert(tag);
        }
    }

    /// Add the generation if absent, remove it if present.
    pub fn toggle_generation(&mut self, generation: Generation) {
        if !self.generation_filters.remove(&generation) {
            self.generation_filters.insert(generation);
        }
    }

    pub fn set_sort_by(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_direction = self.sort_direction.toggled();
    }

    /// Reset search and filters. Sort settings are kept.
    pub fn clear_filters(&mut self) {
        self.category_filters.clear();
        self.generation_filters.clear();
        self.search_query.clear();
    }
}

// =============================================================================
// SEARCH STAGE
// =============================================================================

/// How the search stage interprets a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    /// Pass the whole collection through.
    All,
    /// Exact id lookup. `None` when the digits overflow any id.
    ExactId(Option<u32>),
    /// Fuzzy matching on the trimmed query.
    Fuzzy(String),
}

impl SearchMode {
    /// Classify a raw query.
    ///
    /// Queries shorter than `min_match_len` characters that are not ids
    /// pass everything through, the same as an empty query.
    #[must_use]
    pub fn parse(raw: &str, options: &SearchOptions) -> Self {
        let query = raw.trim();
        if query.is_empty() {
            return Self::All;
        }

        let digits = query.strip_prefix('#').unwrap_or(query);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return Self::ExactId(digits.parse().ok());
        }

        if query.chars().count() < options.min_match_len {
            return Self::All;
        }
        Self::Fuzzy(query.to_string())
    }
}

fn search_stage<'a>(
    records: Vec<&'a Pokemon>,
    query: &str,
    options: &SearchOptions,
) -> Vec<&'a Pokemon> {
    match SearchMode::parse(query, options) {
        SearchMode::All => records,
        SearchMode::ExactId(None) => Vec::new(),
        SearchMode::ExactId(Some(id)) => records.into_iter().filter(|p| p.id.0 == id).collect(),
        SearchMode::Fuzzy(query) => fuzzy::search(records, &query, options)
            .map(|hits| hits.into_iter().map(|hit| hit.record).collect())
            .unwrap_or_default(),
    }
}

// =============================================================================
// VIEW DERIVATION
// =============================================================================

/// Derive the visible ordered subset with default search options.
pub fn derive_view<'a>(
    collection: impl IntoIterator<Item = &'a Pokemon>,
    spec: &FilterSpec,
) -> Vec<&'a Pokemon> {
    derive_view_with(collection, spec, &SearchOptions::default())
}

/// Derive the visible ordered subset.
///
/// Never fails: an empty collection or an over-constrained filter yields an
/// empty view.
pub fn derive_view_with<'a>(
    collection: impl IntoIterator<Item = &'a Pokemon>,
    spec: &FilterSpec,
    options: &SearchOptions,
) -> Vec<&'a Pokemon> {
    let records: Vec<&Pokemon> = collection.into_iter().collect();

    let mut view = search_stage(records, &spec.search_query, options);

    if !spec.category_filters.is_empty() {
        view.retain(|p| p.types.iter().any(|t| spec.category_filters.contains(&t)));
    }

    if !spec.generation_filters.is_empty() {
        view.retain(|p| spec.generation_filters.contains(&p.generation()));
    }

    let key = spec.sort_key;
    match spec.sort_direction {
        SortDirection::Asc => view.sort_by(|a, b| compare(a, b, key)),
        SortDirection::Desc => view.sort_by(|a, b| compare(b, a, key)),
    }

    view
}

// =============================================================================
// TESTS
// =============================================================================
