//! # Fetch Client
//!
//! Resolves one id to a fully assembled record.
//!
//! 1. Record store hit: returned without network access
//! 2. Miss: entity request, then the species request it links to
//! 3. Assembled record is stored and returned
//!
//! Concurrent calls for the same uncached id share one in-flight round trip.
//! Failed trips are not remembered, so the next call retries. Nothing partial
//! is ever stored. An in-flight entry is released when its call finishes or
//! is dropped, e.g. when a failing batch abandons its siblings.

use crate::client::PokeApiClient;
use pokedex_core::{DexError, Pokemon, PokemonId, RecordStore, assemble};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type InFlight = BTreeMap<PokemonId, Arc<OnceCell<Pokemon>>>;

/// Cache-first record fetcher with per-id request coalescing.
#[derive(Debug)]
pub struct Fetcher {
    store: Arc<RecordStore>,
    api: PokeApiClient,
    inflight: Mutex<InFlight>,
}

impl Fetcher {
    pub fn new(store: Arc<RecordStore>, api: PokeApiClient) -> Self {
        Self {
            store,
            api,
            inflight: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    #[must_use]
    pub fn api(&self) -> &PokeApiClient {
        &self.api
    }

    fn lock_inflight(&self) -> std::sync::MutexGuard<'_, InFlight> {
        self.inflight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of ids with a remote trip in progress.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock_inflight().len()
    }

    /// Fetch one record, consulting the record store first.
    pub async fn fetch_one(&self, id: PokemonId) -> Result<Pokemon, DexError> {
        if id.0 == 0 {
            return Err(DexError::InvalidId(id.0));
        }
        if let Some(record) = self.store.get(id) {
            return Ok(record);
        }

        let cell = Arc::clone(
            self.lock_inflight()
                .entry(id)
                .or_insert_with(|| Arc::new(OnceCell::new())),
        );
        // Also runs when this future is dropped mid-flight
        let _guard = InFlightGuard {
            fetcher: self,
            id,
            cell: Arc::clone(&cell),
        };

        cell.get_or_try_init(|| self.fetch_remote(id))
            .await
            .cloned()
    }

    fn release(&self, id: PokemonId, cell: &Arc<OnceCell<Pokemon>>) {
        let mut inflight = self.lock_inflight();
        if inflight.get(&id).is_some_and(|c| Arc::ptr_eq(c, cell)) {
            inflight.remove(&id);
        }
    }

    async fn fetch_remote(&self, id: PokemonId) -> Result<Pokemon, DexError> {
        let entity = self.api.pokemon(id).await?;
        let species = self.api.species(&entity.species.url).await?;
        let record = assemble(&entity, &species)?;
        tracing::debug!(id = id.0, name = %record.name, "fetched record");
        self.store.put(record.clone());
        Ok(record)
    }
}

/// Removes an id's in-flight entry when its `fetch_one` completes or is
/// cancelled.
struct InFlightGuard<'a> {
    fetcher: &'a Fetcher,
    id: PokemonId,
    cell: Arc<OnceCell<Pokemon>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.fetcher.release(self.id, &self.cell);
    }
}
