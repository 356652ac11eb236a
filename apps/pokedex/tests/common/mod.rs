//! Shared fixtures: an in-process fake of the remote API.
//!
//! The fake serves PokeAPI-shaped JSON for `/pokemon/{id}` and
//! `/pokemon-species/{id}` on an ephemeral localhost port and counts every
//! request, so tests can assert how often the network was hit.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use pokedex::{Fetcher, Loader, PokeApiClient};
use pokedex_core::{MemoryStore, RecordStore};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// =============================================================================
// FAKE REMOTE
// =============================================================================

#[derive(Clone)]
struct FakeState {
    base_url: String,
    max_id: u32,
    failing: Arc<BTreeSet<u32>>,
    delay: Duration,
    entity_calls: Arc<AtomicUsize>,
    species_calls: Arc<AtomicUsize>,
}

/// A running fake remote API.
pub struct FakeRemote {
    pub base_url: String,
    entity_calls: Arc<AtomicUsize>,
    species_calls: Arc<AtomicUsize>,
}

impl FakeRemote {
    /// Requests made to `/pokemon/{id}`.
    pub fn entity_calls(&self) -> usize {
        self.entity_calls.load(Ordering::SeqCst)
    }

    /// Requests made to `/pokemon-species/{id}`.
    pub fn species_calls(&self) -> usize {
        self.species_calls.load(Ordering::SeqCst)
    }

    /// A loader over a fresh in-memory record store.
    pub fn loader(&self) -> Loader {
        self.loader_with_store(Arc::new(RecordStore::new(Arc::new(MemoryStore::new()))))
    }

    pub fn loader_with_store(&self, store: Arc<RecordStore>) -> Loader {
        let api = PokeApiClient::new(self.base_url.as_str());
        Loader::new(Arc::new(Fetcher::new(store, api)))
    }
}

/// Configures and starts a `FakeRemote`.
pub struct FakeRemoteBuilder {
    max_id: u32,
    failing: BTreeSet<u32>,
    delay: Duration,
}

impl Default for FakeRemoteBuilder {
    fn default() -> Self {
        Self {
            max_id: 1025,
            failing: BTreeSet::new(),
            delay: Duration::ZERO,
        }
    }
}

impl FakeRemoteBuilder {
    /// Ids above `max_id` answer 404.
    pub fn max_id(mut self, max_id: u32) -> Self {
        self.max_id = max_id;
        self
    }

    /// The entity endpoint answers 500 for this id, without delay.
    pub fn failing(mut self, id: u32) -> Self {
        self.failing.insert(id);
        self
    }

    /// Delay every successful entity response.
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    pub async fn start(self) -> FakeRemote {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = FakeState {
            base_url: base_url.clone(),
            max_id: self.max_id,
            failing: Arc::new(self.failing),
            delay: self.delay,
            entity_calls: Arc::new(AtomicUsize::new(0)),
            species_calls: Arc::new(AtomicUsize::new(0)),
        };
        let remote = FakeRemote {
            base_url,
            entity_calls: Arc::clone(&state.entity_calls),
            species_calls: Arc::clone(&state.species_calls),
        };

        let router = Router::new()
            .route("/pokemon/{id}", get(entity_handler))
            .route("/pokemon-species/{id}", get(species_handler))
            .with_state(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        remote
    }
}

pub fn fake_remote() -> FakeRemoteBuilder {
    FakeRemoteBuilder::default()
}

// =============================================================================
// CANNED PAYLOADS
// =============================================================================

/// Canned name and types for an id.
pub fn species_of(id: u32) -> (String, Vec<&'static str>) {
    match id {
        1 => ("bulbasaur".to_string(), vec!["grass", "poison"]),
        4 => ("charmander".to_string(), vec!["fire"]),
        6 => ("charizard".to_string(), vec!["fire", "flying"]),
        7 => ("squirtle".to_string(), vec!["water"]),
        25 => ("pikachu".to_string(), vec!["electric"]),
        155 => ("cyndaquil".to_string(), vec!["fire"]),
        _ => {
            let tag = ["normal", "bug", "rock"][(id % 3) as usize];
            (format!("species-{}", id), vec![tag])
        }
    }
}

pub fn entity_json(base_url: &str, id: u32) -> Value {
    let (name, types) = species_of(id);
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "slot": i + 1, "type": { "name": t, "url": "" } }))
        .collect();
    let base = 40 + (id % 60);
    let stats: Vec<Value> = [
        "hp",
        "attack",
        "defense",
        "special-attack",
        "special-defense",
        "speed",
    ]
    .iter()
    .map(|s| json!({ "base_stat": base, "effort": 0, "stat": { "name": s, "url": "" } }))
    .collect();

    json!({
        "id": id,
        "name": name,
        "height": 7,
        "weight": 69,
        "base_experience": 64,
        "types": types,
        "abilities": [
            { "ability": { "name": "overgrow", "url": "" }, "is_hidden": false, "slot": 1 },
            { "ability": { "name": "chlorophyll", "url": "" }, "is_hidden": true, "slot": 3 }
        ],
        "stats": stats,
        "sprites": {
            "front_default": format!("{}/sprites/{}.png", base_url, id),
            "front_shiny": null,
            "other": { "official-artwork": { "front_default": format!("{}/art/{}.png", base_url, id) } }
        },
        "species": { "name": name, "url": format!("{}/pokemon-species/{}", base_url, id) }
    })
}

pub fn species_json(id: u32) -> Value {
    json!({
        "is_legendary": id == 150,
        "is_mythical": id == 151,
        "flavor_text_entries": [
            { "flavor_text": "Une graine.", "language": { "name": "fr", "url": "" }, "version": { "name": "red", "url": "" } },
            { "flavor_text": "A strange seed was\nplanted on its\u{c}back at birth.", "language": { "name": "en", "url": "" }, "version": { "name": "red", "url": "" } },
            { "flavor_text": "A strange seed was planted on its back at birth.", "language": { "name": "en", "url": "" }, "version": { "name": "blue", "url": "" } },
            { "flavor_text": "It can go for days without eating.", "language": { "name": "en", "url": "" }, "version": { "name": "fire-red", "url": "" } }
        ],
        "genera": [
            { "genus": "Pokémon Graine", "language": { "name": "fr", "url": "" } },
            { "genus": "Seed Pokémon", "language": { "name": "en", "url": "" } }
        ]
    })
}

async fn entity_handler(State(state): State<FakeState>, Path(id): Path<u32>) -> Response {
    state.entity_calls.fetch_add(1, Ordering::SeqCst);
    if state.failing.contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    if id == 0 || id > state.max_id {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    Json(entity_json(&state.base_url, id)).into_response()
}

async fn species_handler(State(state): State<FakeState>, Path(id): Path<u32>) -> Response {
    state.species_calls.fetch_add(1, Ordering::SeqCst);
    if id == 0 || id > state.max_id {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    Json(species_json(id)).into_response()
}
