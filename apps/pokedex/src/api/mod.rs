//! # Pokedex HTTP API Module
//!
//! Read-mostly JSON surface over the collection state, for the presentation
//! layer.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Collection size, loading flag, last error, cache stats
//! - `GET /pokemon` - Derived view (`q`, `types`, `generations`, `sort`, `order`)
//! - `GET /pokemon/{id}` - One record
//! - `GET /pokemon/{id}/siblings` - Previous/next records in the active view
//! - `POST /filters` - Apply one filter mutation to the shared specification
//!
//! ## Configuration (Environment Variables)
//!
//! - `POKEDEX_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `pokedex::api::*`)
pub use handlers::{
    filters_handler, get_handler, health_handler, list_handler, siblings_handler, status_handler,
};
pub use types::{
    ErrorResponse, FilterMutation, HealthResponse, ListParams, ListResponse, StatusResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use pokedex_core::{CollectionState, DexError, RecordStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const ENV_CORS_ORIGINS: &str = "POKEDEX_CORS_ORIGINS";

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the collection and the record cache behind it.
#[derive(Clone)]
pub struct AppState {
    pub collection: Arc<RwLock<CollectionState>>,
    pub store: Arc<RecordStore>,
}

impl AppState {
    /// Create new app state around a collection.
    #[must_use]
    pub fn new(collection: CollectionState, store: Arc<RecordStore>) -> Self {
        Self {
            collection: Arc::new(RwLock::new(collection)),
            store,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `POKEDEX_CORS_ORIGINS`.
///
/// - `*`: allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var(ENV_CORS_ORIGINS).ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins ({}=*)", ENV_CORS_ORIGINS);
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in {}, defaulting to localhost only",
                    ENV_CORS_ORIGINS
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => build_localhost_cors(),
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, then CORS.
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer());

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/pokemon", get(handlers::list_handler))
        .route("/pokemon/{id}", get(handlers::get_handler))
        .route("/pokemon/{id}/siblings", get(handlers::siblings_handler))
        .route("/filters", post(handlers::filters_handler))
        .layer(middleware)
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve `state` on `addr` until Ctrl-C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), DexError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DexError::Io(format!("Bind failed on {}: {}", addr, e)))?;

    tracing::info!("Pokedex HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DexError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
