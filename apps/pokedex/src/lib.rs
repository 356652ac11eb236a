//! # pokedex
//!
//! The async half of the Pokedex: remote fetching, bulk loading, the CLI and
//! the JSON server. All catalog logic lives in `pokedex-core`.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod fetcher;
pub mod loader;

pub use client::PokeApiClient;
pub use config::Config;
pub use fetcher::Fetcher;
pub use loader::{Loader, PopulateReport};
