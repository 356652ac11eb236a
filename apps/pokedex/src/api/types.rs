//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use pokedex_core::{
    CacheStats, CollectionState, DexError, FilterSpec, Generation, Pokemon, PokemonType,
    SortDirection, SortKey,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Collection and cache status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub record_count: usize,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub cache: CacheStats,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =============================================================================
// LIST QUERY / RESPONSE
// =============================================================================

/// Query parameters of `GET /pokemon`.
///
/// `types` and `generations` are comma-separated lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub types: Option<String>,
    pub generations: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    /// True when no parameter was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.q.is_none()
            && self.types.is_none()
            && self.generations.is_none()
            && self.sort.is_none()
            && self.order.is_none()
    }

    /// Build a one-off filter specification.
    pub fn to_filter_spec(&self) -> Result<FilterSpec, DexError> {
        let mut spec = FilterSpec::new();

        if let Some(q) = &self.q {
            spec.set_search_query(q.as_str());
        }
        for tag in list_items(self.types.as_deref()) {
            spec.category_filters.insert(tag.parse::<PokemonType>()?);
        }
        for raw in list_items(self.generations.as_deref()) {
            let index = raw
                .parse::<u8>()
                .map_err(|_| DexError::Config(format!("invalid generation '{}'", raw)))?;
            spec.generation_filters.insert(Generation::new(index)?);
        }
        if let Some(sort) = &self.sort {
            spec.set_sort_by(sort.parse::<SortKey>()?);
        }
        if let Some(order) = &self.order {
            spec.sort_direction = order.parse::<SortDirection>()?;
        }

        Ok(spec)
    }
}

fn list_items(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// The derived view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub count: usize,
    pub filters: FilterSpec,
    pub pokemon: Vec<Pokemon>,
}

// =============================================================================
// FILTER MUTATIONS
// =============================================================================

/// One filter mutation, as posted to `/filters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterMutation {
    SetSearchQuery { query: String },
    ToggleCategory { category: PokemonType },
    ToggleGeneration { generation: Generation },
    SetSortBy { key: SortKey },
    ToggleSortOrder,
    ClearFilters,
}

impl FilterMutation {
    /// Apply to the collection's active specification.
    pub fn apply(self, state: &mut CollectionState) {
        match self {
            Self::SetSearchQuery { query } => state.set_search_query(query),
            Self::ToggleCategory { category } => state.toggle_category(category),
            Self::ToggleGeneration { generation } => state.toggle_generation(generation),
            Self::SetSortBy { key } => state.set_sort_by(key),
            Self::ToggleSortOrder => state.toggle_sort_order(),
            Self::ClearFilters => state.clear_filters(),
        }
    }
}
