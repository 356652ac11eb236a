//! # Pokedex CLI Module
//!
//! This module implements the CLI interface for Pokedex.
//!
//! ## Available Commands
//!
//! - `fetch` - Fetch one record (cache first)
//! - `range` - Fetch an inclusive id range concurrently
//! - `generation` - Fetch one generation band
//! - `search` - Populate bands, then search, filter and sort
//! - `show` - Print the full card of one record
//! - `cache` - Show or clear the record cache
//! - `serve` - Start the HTTP server and populate in the background

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use pokedex_core::DexError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Pokedex - species catalog loader and query engine
///
/// Fetches records from a PokeAPI-compatible server, caches them for seven
/// days and answers fuzzy, filtered and sorted queries.
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: ./pokedex.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the remote API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to the record cache database
    #[arg(long, global = true)]
    pub cache_path: Option<PathBuf>,

    /// Keep the record cache in memory only
    #[arg(long, global = true)]
    pub memory_cache: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one record by id
    Fetch {
        /// Record id
        id: u32,
    },

    /// Fetch every record in an inclusive id range
    Range {
        /// First id
        start: u32,
        /// Last id
        end: u32,
    },

    /// Fetch every record of a generation (1-9)
    Generation {
        /// Generation index
        index: u8,
    },

    /// Load generations, then print the derived view
    Search {
        /// Name, type or ability query; `25` or `#025` looks up an id
        #[arg(short = 'Q', long)]
        query: Option<String>,

        /// Category filter (repeatable, OR semantics)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,

        /// Generation filter (repeatable, OR semantics); also limits loading
        #[arg(short = 'g', long = "gen")]
        generations: Vec<u8>,

        /// Sort key (id, name, stats)
        #[arg(short, long, default_value = "id")]
        sort: String,

        /// Sort descending
        #[arg(short, long)]
        desc: bool,
    },

    /// Print the full card of one record
    Show {
        /// Record id
        id: u32,
    },

    /// Inspect or clear the record cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Start HTTP server
    Serve {
        /// Host to bind to (default from config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Cache subcommands.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CacheAction {
    /// Show entry counts
    Stats,
    /// Delete every cached record
    Clear,
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Load the layered config and apply the global flags on top.
pub fn resolve_config(cli: &Cli) -> Result<Config, DexError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url.clone_from(url);
    }
    if let Some(path) = &cli.cache_path {
        config.cache.path.clone_from(path);
    }
    if cli.memory_cache {
        config.cache.memory_only = true;
    }
    Ok(config)
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), DexError> {
    let mut config = resolve_config(&cli)?;
    let json_mode = cli.json;

    match cli.command {
        Some(Commands::Fetch { id }) => cmd_fetch(&config, json_mode, id).await,
        Some(Commands::Range { start, end }) => cmd_range(&config, json_mode, start, end).await,
        Some(Commands::Generation { index }) => {
            cmd_generation(&config, json_mode, index).await
        }
        Some(Commands::Search {
            query,
            types,
            generations,
            sort,
            desc,
        }) => {
            let request = SearchRequest {
                query,
                types,
                generations,
                sort,
                desc,
            };
            cmd_search(&config, json_mode, &request).await
        }
        Some(Commands::Show { id }) => cmd_show(&config, json_mode, id).await,
        Some(Commands::Cache { action }) => cmd_cache(&config, json_mode, action),
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_serve(&config).await
        }
        None => {
            // No subcommand - show cache stats by default
            cmd_cache(&config, json_mode, CacheAction::Stats)
        }
    }
}
