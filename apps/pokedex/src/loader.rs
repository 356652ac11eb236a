//! # Range / Generation Loader
//!
//! Bulk fetches over an id range or a generation band, and the progressive
//! population that drives them into the collection.
//!
//! A batch issues one fetch per id concurrently and is all-or-nothing: the
//! first failure fails the whole call and no partial batch is returned.
//! Retry and partial acceptance belong to the caller. `populate` is that
//! caller: it loads band by band, keeps what has merged so far, and records
//! a non-fatal error when a band fails.

use crate::fetcher::Fetcher;
use futures_util::future::try_join_all;
use pokedex_core::primitives::MAX_POKEMON_ID;
use pokedex_core::{CollectionState, DexError, Generation, Pokemon, PokemonId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of one progressive population run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateReport {
    /// Generations merged into the collection.
    pub loaded: Vec<Generation>,
    /// Generations that failed, with the error message.
    pub failed: Vec<(Generation, String)>,
    /// Records merged across all bands.
    pub records: usize,
}

/// Concurrent bulk loader over a shared fetcher.
#[derive(Debug, Clone)]
pub struct Loader {
    fetcher: Arc<Fetcher>,
}

impl Loader {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    #[must_use]
    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    /// Fetch every id in `start..=end`, ordered by ascending id.
    ///
    /// A range wider than the catalog is rejected before any request.
    pub async fn fetch_range(&self, start: u32, end: u32) -> Result<Vec<Pokemon>, DexError> {
        if start == 0 || start > end || end - start >= MAX_POKEMON_ID {
            return Err(DexError::InvalidRange { start, end });
        }

        tracing::info!(start, end, "loading range");
        let fetches = (start..=end).map(|raw| self.fetcher.fetch_one(PokemonId(raw)));
        // Output order follows input order, which is ascending id
        let records = try_join_all(fetches).await.inspect_err(|e| {
            tracing::warn!(start, end, error = %e, "range load failed");
        })?;

        tracing::info!(start, end, count = records.len(), "range loaded");
        Ok(records)
    }

    /// Fetch every record of one generation band.
    pub async fn fetch_generation(&self, index: u8) -> Result<Vec<Pokemon>, DexError> {
        let generation = Generation::new(index)?;
        let band = generation.band();
        self.fetch_range(*band.start(), *band.end()).await
    }

    /// Load `generations` in order, merging each band as it completes.
    ///
    /// A failing band sets the collection's last error and loading moves on
    /// to the next band. Records merged before the failure stay visible.
    pub async fn populate(
        &self,
        state: &RwLock<CollectionState>,
        generations: &[Generation],
    ) -> PopulateReport {
        {
            let mut state = state.write().await;
            state.set_loading(true);
            state.set_error(None);
        }

        let mut report = PopulateReport::default();
        for &generation in generations {
            match self.fetch_generation(generation.index()).await {
                Ok(records) => {
                    let count = records.len();
                    state.write().await.add(records);
                    report.loaded.push(generation);
                    report.records += count;
                }
                Err(e) => {
                    tracing::warn!(
                        generation = generation.index(),
                        error = %e,
                        "generation failed to load, continuing with loaded data"
                    );
                    let message = format!("Failed to load generation {}: {}", generation, e);
                    state.write().await.set_error(Some(message.clone()));
                    report.failed.push((generation, message));
                }
            }
        }

        state.write().await.set_loading(false);
        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            records = report.records,
            "population finished"
        );
        report
    }
}
