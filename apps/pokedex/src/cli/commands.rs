//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState};
use crate::client::PokeApiClient;
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::loader::Loader;
use pokedex_core::display::{StatLevel, display_name, stat_percent};
use pokedex_core::generation::roman;
use pokedex_core::source::flavor_texts;
use pokedex_core::{
    CollectionState, DexError, DurableStore, FilterSpec, Generation, LegendaryStatus, Pokemon,
    PokemonId, PokemonType, RecordStore, RedbStore, SortDirection, SortKey,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::CacheAction;

/// Flavor texts printed by `show`.
const SHOW_FLAVOR_TEXTS: usize = 3;

/// Width of the stat bar printed by `show`.
const BAR_WIDTH: usize = 20;

// =============================================================================
// WIRING
// =============================================================================

/// Build the fetch/load stack the config describes.
fn build_loader(config: &Config) -> Result<Loader, DexError> {
    let store = config.open_store()?;
    let api = PokeApiClient::new(config.api.base_url.as_str());
    Ok(Loader::new(Arc::new(Fetcher::new(store, api))))
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// One summary line: `#025 Pikachu           electric         320`.
fn print_record_line(record: &Pokemon) {
    let types: Vec<&str> = record.types.iter().map(|t| t.as_str()).collect();
    println!(
        "{:<6} {:<18} {:<18} {:>4}",
        record.id.to_string(),
        display_name(&record.name),
        types.join("/"),
        record.stat_total()
    );
}

fn print_records(records: &[&Pokemon], json_mode: bool) {
    if json_mode {
        print_json(&records);
        return;
    }
    for record in records {
        print_record_line(record);
    }
    println!();
    println!("{} record(s)", records.len());
}

// =============================================================================
// FETCH COMMANDS
// =============================================================================

/// Fetch one record.
pub async fn cmd_fetch(config: &Config, json_mode: bool, id: u32) -> Result<(), DexError> {
    let loader = build_loader(config)?;
    let record = loader.fetcher().fetch_one(PokemonId::new(id)?).await?;
    print_records(&[&record], json_mode);
    Ok(())
}

/// Fetch an inclusive id range.
pub async fn cmd_range(
    config: &Config,
    json_mode: bool,
    start: u32,
    end: u32,
) -> Result<(), DexError> {
    let loader = build_loader(config)?;
    let records = loader.fetch_range(start, end).await?;
    let refs: Vec<&Pokemon> = records.iter().collect();
    print_records(&refs, json_mode);
    Ok(())
}

/// Fetch one generation band.
pub async fn cmd_generation(config: &Config, json_mode: bool, index: u8) -> Result<(), DexError> {
    let loader = build_loader(config)?;
    let records = loader.fetch_generation(index).await?;
    let refs: Vec<&Pokemon> = records.iter().collect();
    print_records(&refs, json_mode);
    Ok(())
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Arguments of `search`.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub types: Vec<String>,
    pub generations: Vec<u8>,
    pub sort: String,
    pub desc: bool,
}

impl SearchRequest {
    /// Validate the arguments into a filter specification.
    pub fn to_filter_spec(&self) -> Result<FilterSpec, DexError> {
        let mut spec = FilterSpec::new();
        if let Some(query) = &self.query {
            spec.set_search_query(query.as_str());
        }
        for tag in &self.types {
            spec.category_filters.insert(tag.parse::<PokemonType>()?);
        }
        for &index in &self.generations {
            spec.generation_filters.insert(Generation::new(index)?);
        }
        spec.set_sort_by(self.sort.parse::<SortKey>()?);
        if self.desc {
            spec.sort_direction = SortDirection::Desc;
        }
        Ok(spec)
    }
}

/// Populate the selected generations, then print the derived view.
pub async fn cmd_search(
    config: &Config,
    json_mode: bool,
    request: &SearchRequest,
) -> Result<(), DexError> {
    let spec = request.to_filter_spec()?;
    let loader = build_loader(config)?;

    // Only bands that can pass the generation filter need loading
    let bands: Vec<Generation> = if spec.generation_filters.is_empty() {
        config.load.generations.clone()
    } else {
        spec.generation_filters.iter().copied().collect()
    };

    let state = RwLock::new(CollectionState::with_search_options(
        config.search_options(),
    ));
    let report = loader.populate(&state, &bands).await;
    for (generation, message) in &report.failed {
        tracing::warn!(generation = generation.index(), "{}", message);
    }

    let state = state.into_inner();
    let view = state.view_with(&spec);
    print_records(&view, json_mode);
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

fn level_label(level: StatLevel) -> &'static str {
    match level {
        StatLevel::Low => "low",
        StatLevel::Medium => "medium",
        StatLevel::High => "high",
    }
}

fn stat_bar(value: u16) -> String {
    let filled = usize::from(stat_percent(value)) * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Print the full card of one record.
pub async fn cmd_show(config: &Config, json_mode: bool, id: u32) -> Result<(), DexError> {
    let loader = build_loader(config)?;
    let fetcher = loader.fetcher();
    let id = PokemonId::new(id)?;
    let record = fetcher.fetch_one(id).await?;

    // Flavor texts are not cached; a failure only drops that section
    let flavors = match fetcher.api().species_by_id(id).await {
        Ok(species) => flavor_texts(&species, SHOW_FLAVOR_TEXTS),
        Err(e) => {
            tracing::warn!(id = id.0, error = %e, "could not load flavor texts");
            Vec::new()
        }
    };

    if json_mode {
        let output = serde_json::json!({
            "pokemon": record,
            "generation": record.generation(),
            "region": record.region(),
            "image": record.image_url(),
            "flavor_texts": flavors,
        });
        print_json(&output);
        return Ok(());
    }

    let generation = record.generation();
    println!("{} {}", record.id, display_name(&record.name));
    println!("{}", "=".repeat(40));
    println!("Category:   {}", record.category);
    let types: Vec<String> = record.types.iter().map(|t| display_name(t.as_str())).collect();
    println!("Types:      {}", types.join(" / "));
    println!(
        "Generation: {} ({})",
        roman(generation),
        display_name(record.region().as_str())
    );
    match record.legendary_status {
        LegendaryStatus::Normal => {}
        LegendaryStatus::Legendary => println!("Status:     Legendary"),
        LegendaryStatus::Mythical => println!("Status:     Mythical"),
    }
    println!("Height:     {} m", record.height);
    println!("Weight:     {} kg", record.weight);
    let abilities: Vec<String> = record.abilities.iter().map(|a| display_name(a)).collect();
    println!("Abilities:  {}", abilities.join(", "));
    if let Some(image) = record.image_url() {
        println!("Image:      {}", image);
    }
    println!();

    for (kind, value) in record.stats.iter() {
        println!(
            "  {:<8} {:>3} {} {}",
            kind.label(),
            value,
            stat_bar(value),
            level_label(StatLevel::of(value))
        );
    }
    println!("  {:<8} {:>3}", "TOTAL", record.stat_total());
    println!();

    println!("{}", record.description);
    for flavor in &flavors {
        println!();
        println!("[{}] {}", flavor.version, flavor.text);
    }

    Ok(())
}

// =============================================================================
// CACHE COMMAND
// =============================================================================

/// Show or clear the record cache.
pub fn cmd_cache(config: &Config, json_mode: bool, action: CacheAction) -> Result<(), DexError> {
    if config.cache.memory_only {
        tracing::info!("Memory-only cache: nothing persisted");
    }

    // Keep a typed handle so the file can be compacted after a clear
    let redb = if config.cache.memory_only {
        None
    } else {
        Some(Arc::new(RedbStore::open(&config.cache.path)?))
    };
    let store = match &redb {
        Some(redb) => RecordStore::new(Arc::clone(redb) as Arc<dyn DurableStore>),
        None => RecordStore::in_memory(),
    };

    let before = store.stats();
    if let CacheAction::Clear = action {
        store.clear();
        drop(store);
        if let Some(mut redb) = redb.and_then(|r| Arc::try_unwrap(r).ok()) {
            redb.compact()?;
        }
    }

    if json_mode {
        let output = serde_json::json!({
            "path": config.cache.path.to_string_lossy(),
            "memory_only": config.cache.memory_only,
            "durable_count": before.durable_count,
            "cleared": matches!(action, CacheAction::Clear),
        });
        print_json(&output);
        return Ok(());
    }

    println!("Pokedex Record Cache");
    println!("====================");
    println!("Path:    {:?}", config.cache.path);
    println!("Entries: {}", before.durable_count);
    if let CacheAction::Clear = action {
        println!("Cleared {} entries", before.durable_count);
    }

    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server and populate the configured bands in the background.
pub async fn cmd_serve(config: &Config) -> Result<(), DexError> {
    let loader = build_loader(config)?;
    let store = Arc::clone(loader.fetcher().store());
    let state = AppState::new(
        CollectionState::with_search_options(config.search_options()),
        store,
    );

    println!("Pokedex Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", config.bind_addr());
    println!("  API:      {}", config.api.base_url);
    println!("  Cache:    {:?}", config.cache.path);
    println!();
    println!("Endpoints:");
    println!("  GET  /health              - Health check");
    println!("  GET  /status              - Collection and cache status");
    println!("  GET  /pokemon             - Derived view");
    println!("  GET  /pokemon/{{id}}        - One record");
    println!("  GET  /pokemon/{{id}}/siblings");
    println!("  POST /filters             - Apply a filter mutation");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let collection = Arc::clone(&state.collection);
    let generations = config.load.generations.clone();
    tokio::spawn(async move {
        loader.populate(&collection, &generations).await;
    });

    api::run_server(&config.bind_addr(), state).await
}
