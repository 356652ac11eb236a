//! # Query Benchmarks
//!
//! Performance benchmarks for the pokedex-core view derivation.
//!
//! Run with: `cargo bench -p pokedex-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pokedex_core::{
    FilterSpec, Generation, LegendaryStatus, Pokemon, PokemonId, PokemonType, SortKey, Sprites,
    Stats, Tenths, TypeSet, derive_view,
};
use std::hint::black_box;

/// Build a synthetic catalog of `size` records with rotating tags.
fn create_catalog(size: u32) -> Vec<Pokemon> {
    (1..=size)
        .map(|i| {
            let tag = PokemonType::ALL[(i as usize) % PokemonType::ALL.len()];
            Pokemon {
                id: PokemonId(i),
                name: format!("species{}", i),
                search_terms: Vec::new(),
                types: TypeSet::new([tag]).expect("non-empty"),
                height: Tenths(10),
                weight: Tenths(100),
                abilities: vec![format!("ability{}", i % 37)],
                stats: Stats {
                    hp: (i % 200) as u16 + 1,
                    ..Stats::default()
                },
                sprites: Sprites::default(),
                legendary_status: LegendaryStatus::Normal,
                description: String::new(),
                category: String::new(),
            }
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_fuzzy_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuzzy_search");

    for size in [151, 500, 1025].iter() {
        let catalog = create_catalog(*size);
        let mut spec = FilterSpec::new();
        spec.set_search_query("specis42");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(derive_view(&catalog, &spec)));
        });
    }

    group.finish();
}

fn bench_filter_and_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_sort");

    for size in [151, 500, 1025].iter() {
        let catalog = create_catalog(*size);
        let mut spec = FilterSpec::new();
        spec.toggle_category(PokemonType::Fire);
        spec.toggle_category(PokemonType::Water);
        spec.toggle_generation(Generation::new(1).expect("valid"));
        spec.toggle_generation(Generation::new(5).expect("valid"));
        spec.set_sort_by(SortKey::StatTotal);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(derive_view(&catalog, &spec)));
        });
    }

    group.finish();
}

fn bench_exact_id(c: &mut Criterion) {
    let catalog = create_catalog(1025);
    let mut spec = FilterSpec::new();
    spec.set_search_query("#512");

    c.bench_function("exact_id_1025", |b| {
        b.iter(|| black_box(derive_view(&catalog, &spec)));
    });
}

criterion_group!(
    benches,
    bench_fuzzy_search,
    bench_filter_and_sort,
    bench_exact_id
);
criterion_main!(benches);
