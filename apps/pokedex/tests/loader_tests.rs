//! Integration tests for the Fetch Client and the Range/Generation Loader.
//!
//! Every test talks to an in-process fake remote through the real reqwest
//! client.

#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::fake_remote;
use pokedex::loader::PopulateReport;
use pokedex_core::primitives::CACHE_TTL_MS;
use pokedex_core::{
    CollectionState, DexError, Generation, LegendaryStatus, ManualClock, MemoryStore, PokemonId,
    PokemonType, RecordStore, RedbStore,
};
use std::sync::Arc;
use tokio::sync::RwLock;

// =============================================================================
// FETCH CLIENT
// =============================================================================

#[tokio::test]
async fn fetch_one_assembles_record() {
    let remote = fake_remote().start().await;
    let loader = remote.loader();

    let record = loader.fetcher().fetch_one(PokemonId(25)).await.unwrap();

    assert_eq!(record.id, PokemonId(25));
    assert_eq!(record.name, "pikachu");
    assert_eq!(record.primary_type(), PokemonType::Electric);
    assert_eq!(record.category, "Seed Pokémon");
    assert_eq!(
        record.description,
        "A strange seed was planted on its back at birth."
    );
    assert_eq!(record.height.to_string(), "0.7");
    assert_eq!(record.generation(), Generation::new(1).unwrap());
    assert!(record.image_url().unwrap().ends_with("/art/25.png"));
    assert_eq!(remote.entity_calls(), 1);
    assert_eq!(remote.species_calls(), 1);
}

#[tokio::test]
async fn legendary_flag_is_carried() {
    let remote = fake_remote().start().await;
    let record = remote
        .loader()
        .fetcher()
        .fetch_one(PokemonId(150))
        .await
        .unwrap();
    assert_eq!(record.legendary_status, LegendaryStatus::Legendary);
}

#[tokio::test]
async fn cache_hit_skips_network() {
    let remote = fake_remote().start().await;
    let loader = remote.loader();

    let first = loader.fetcher().fetch_one(PokemonId(4)).await.unwrap();
    let second = loader.fetcher().fetch_one(PokemonId(4)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(remote.entity_calls(), 1);
}

#[tokio::test]
async fn durable_cache_survives_a_new_store() {
    let remote = fake_remote().start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.redb");

    {
        let store = Arc::new(RecordStore::new(Arc::new(RedbStore::open(&path).unwrap())));
        let loader = remote.loader_with_store(store);
        loader.fetcher().fetch_one(PokemonId(7)).await.unwrap();
    }

    let store = Arc::new(RecordStore::new(Arc::new(RedbStore::open(&path).unwrap())));
    let loader = remote.loader_with_store(store);
    let record = loader.fetcher().fetch_one(PokemonId(7)).await.unwrap();

    assert_eq!(record.name, "squirtle");
    assert_eq!(remote.entity_calls(), 1);
}

#[tokio::test]
async fn expired_entry_is_refetched() {
    let remote = fake_remote().start().await;
    let clock = Arc::new(ManualClock::starting_at(10_000));
    let store = Arc::new(RecordStore::with_clock(
        Arc::new(MemoryStore::new()),
        clock.clone(),
    ));
    let loader = remote.loader_with_store(store);

    loader.fetcher().fetch_one(PokemonId(1)).await.unwrap();
    clock.advance(CACHE_TTL_MS + 1);
    loader.fetcher().fetch_one(PokemonId(1)).await.unwrap();

    assert_eq!(remote.entity_calls(), 2);
}

#[tokio::test]
async fn missing_id_is_not_found() {
    let remote = fake_remote().max_id(151).start().await;
    let loader = remote.loader();

    let result = loader.fetcher().fetch_one(PokemonId(152)).await;

    assert_eq!(result, Err(DexError::NotFound(PokemonId(152))));
    assert_eq!(remote.species_calls(), 0);
    assert!(loader.fetcher().store().get(PokemonId(152)).is_none());
}

#[tokio::test]
async fn server_error_is_upstream_and_not_cached() {
    let remote = fake_remote().failing(50).start().await;
    let loader = remote.loader();

    let result = loader.fetcher().fetch_one(PokemonId(50)).await;
    assert!(matches!(result, Err(DexError::Upstream(_))));

    // A second call retries instead of replaying the failure
    let _ = loader.fetcher().fetch_one(PokemonId(50)).await;
    assert_eq!(remote.entity_calls(), 2);
    assert_eq!(loader.fetcher().store().stats().memory_count, 0);
}

#[tokio::test]
async fn zero_id_rejected_without_network() {
    let remote = fake_remote().start().await;
    let result = remote.loader().fetcher().fetch_one(PokemonId(0)).await;
    assert_eq!(result, Err(DexError::InvalidId(0)));
    assert_eq!(remote.entity_calls(), 0);
}

#[tokio::test]
async fn concurrent_requests_for_one_id_are_coalesced() {
    let remote = fake_remote().delay_ms(100).start().await;
    let loader = remote.loader();
    let fetcher = loader.fetcher();

    let (a, b, c) = tokio::join!(
        fetcher.fetch_one(PokemonId(6)),
        fetcher.fetch_one(PokemonId(6)),
        fetcher.fetch_one(PokemonId(6)),
    );

    assert_eq!(a.unwrap().name, "charizard");
    assert!(b.is_ok() && c.is_ok());
    assert_eq!(remote.entity_calls(), 1);
    assert_eq!(fetcher.in_flight(), 0);
}

// =============================================================================
// LOADER
// =============================================================================

#[tokio::test]
async fn range_is_ordered_and_complete() {
    let remote = fake_remote().start().await;
    let records = remote.loader().fetch_range(10, 30).await.unwrap();

    let ids: Vec<u32> = records.iter().map(|p| p.id.0).collect();
    assert_eq!(ids, (10..=30).collect::<Vec<_>>());
}

#[tokio::test]
async fn range_failure_is_all_or_nothing() {
    let remote = fake_remote().failing(50).start().await;
    let result = remote.loader().fetch_range(1, 100).await;
    assert!(matches!(result, Err(DexError::Upstream(_))));
}

#[tokio::test]
async fn failed_batch_releases_abandoned_fetches() {
    // Id 1 fails at once while its siblings are still waiting on the remote
    let remote = fake_remote().failing(1).delay_ms(300).start().await;
    let loader = remote.loader();

    let result = loader.fetch_range(1, 20).await;

    assert!(matches!(result, Err(DexError::Upstream(_))));
    assert_eq!(loader.fetcher().in_flight(), 0);
}

#[tokio::test]
async fn range_wider_than_catalog_rejected() {
    let remote = fake_remote().start().await;
    let result = remote.loader().fetch_range(1, 4_000_000_000).await;
    assert_eq!(
        result,
        Err(DexError::InvalidRange {
            start: 1,
            end: 4_000_000_000
        })
    );
    assert_eq!(remote.entity_calls(), 0);
}

#[tokio::test]
async fn inverted_range_rejected() {
    let remote = fake_remote().start().await;
    let result = remote.loader().fetch_range(20, 10).await;
    assert_eq!(result, Err(DexError::InvalidRange { start: 20, end: 10 }));
    assert_eq!(remote.entity_calls(), 0);
}

#[tokio::test]
async fn generation_resolves_band() {
    let remote = fake_remote().start().await;
    let records = remote.loader().fetch_generation(2).await.unwrap();

    assert_eq!(records.len(), 100);
    assert_eq!(records.first().map(|p| p.id.0), Some(152));
    assert_eq!(records.last().map(|p| p.id.0), Some(251));
}

#[tokio::test]
async fn generation_out_of_range_rejected() {
    let remote = fake_remote().start().await;
    let loader = remote.loader();

    assert_eq!(
        loader.fetch_generation(0).await,
        Err(DexError::InvalidGeneration(0))
    );
    assert_eq!(
        loader.fetch_generation(10).await,
        Err(DexError::InvalidGeneration(10))
    );
    assert_eq!(remote.entity_calls(), 0);
}

// =============================================================================
// PROGRESSIVE POPULATION
// =============================================================================

#[tokio::test]
async fn populate_keeps_loaded_bands_after_a_failure() {
    // 160 is in generation 2; generations 1 and 3 load fine
    let remote = fake_remote().failing(160).start().await;
    let loader = remote.loader();
    let state = RwLock::new(CollectionState::new());
    let generations: Vec<Generation> = [1, 2, 3]
        .into_iter()
        .map(|g| Generation::new(g).unwrap())
        .collect();

    let report: PopulateReport = loader.populate(&state, &generations).await;

    assert_eq!(
        report.loaded,
        vec![Generation::new(1).unwrap(), Generation::new(3).unwrap()]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.records, 151 + 135);

    let state = state.read().await;
    assert_eq!(state.len(), 151 + 135);
    assert!(!state.is_loading());
    assert!(state.last_error().unwrap().contains("generation 2"));
    assert!(state.get(PokemonId(152)).is_none());
}

#[tokio::test]
async fn populate_clears_previous_error() {
    let remote = fake_remote().start().await;
    let loader = remote.loader();
    let mut initial = CollectionState::new();
    initial.set_error(Some("stale".to_string()));
    let state = RwLock::new(initial);

    loader
        .populate(&state, &[Generation::new(1).unwrap()])
        .await;

    let state = state.read().await;
    assert!(state.last_error().is_none());
    assert_eq!(state.len(), 151);
}
