//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        ErrorResponse, FilterMutation, HealthResponse, ListParams, ListResponse, StatusResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pokedex_core::{CacheStats, PokemonId};
use std::sync::Arc;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Collection size, loading flag, last error and cache counters.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    // The durable count is a full key scan
    let store = Arc::clone(&state.store);
    let cache = tokio::task::spawn_blocking(move || store.stats())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cache stats task failed");
            CacheStats::default()
        });
    let collection = state.collection.read().await;

    let response = StatusResponse {
        record_count: collection.len(),
        is_loading: collection.is_loading(),
        last_error: collection.last_error().map(str::to_string),
        cache,
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// LIST HANDLER
// =============================================================================

/// The derived view, under the shared specification or a one-off one.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    let collection = state.collection.read().await;

    let spec = if params.is_empty() {
        collection.filters().clone()
    } else {
        match params.to_filter_spec() {
            Ok(spec) => spec,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(format!("Invalid filter: {}", e))),
                )
                    .into_response();
            }
        }
    };

    let pokemon: Vec<_> = collection.view_with(&spec).into_iter().cloned().collect();
    let response = ListResponse {
        count: pokemon.len(),
        filters: spec,
        pokemon,
    };

    (StatusCode::OK, Json(response)).into_response()
}

// =============================================================================
// RECORD HANDLERS
// =============================================================================

/// One record by id.
pub async fn get_handler(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let collection = state.collection.read().await;
    match collection.get(PokemonId(id)) {
        Some(record) => (StatusCode::OK, Json(record.clone())).into_response(),
        None => not_found(id),
    }
}

/// Previous and next records around an id in the active view.
pub async fn siblings_handler(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let collection = state.collection.read().await;
    match collection.siblings(PokemonId(id)) {
        Some(siblings) => (StatusCode::OK, Json(siblings)).into_response(),
        None => not_found(id),
    }
}

fn not_found(id: u32) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!(
            "Pokemon {} is not in the collection",
            PokemonId(id)
        ))),
    )
        .into_response()
}

// =============================================================================
// FILTER HANDLER
// =============================================================================

/// Apply one mutation to the shared specification and return the result.
pub async fn filters_handler(
    State(state): State<AppState>,
    Json(mutation): Json<FilterMutation>,
) -> impl IntoResponse {
    let mut collection = state.collection.write().await;
    tracing::debug!(?mutation, "applying filter mutation");
    mutation.apply(&mut collection);
    (StatusCode::OK, Json(collection.filters().clone()))
}
