//! # Pokedex
//!
//! The main binary for the Pokedex catalog engine.
//!
//! This application provides:
//! - CLI interface for fetching, loading and searching records
//! - HTTP JSON API server (axum-based) for a presentation layer
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    apps/pokedex (THE BINARY)                 │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐   │
//! │  │    CLI      │    │  HTTP API   │    │  Fetch / Loader │   │
//! │  │   (clap)    │    │   (axum)    │    │    (reqwest)    │   │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬────────┘   │
//! │         │                  │                    │            │
//! │         └──────────────────┼────────────────────┘            │
//! │                            ▼                                 │
//! │                   ┌────────────────┐                         │
//! │                   │  pokedex-core  │                         │
//! │                   │  (THE LOGIC)   │                         │
//! │                   └────────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! pokedex serve --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! pokedex fetch 25
//! pokedex generation 1
//! pokedex search --query pikuchu
//! pokedex search --type fire --gen 1 --sort stats --desc
//! ```

use clap::Parser;
use pokedex::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // POKEDEX_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("POKEDEX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pokedex=info,pokedex_core=info,tower_http=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Pokedex startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┬┌─┌─┐┌┬┐┌─┐─┐ ┬
  ├─┘│ │├┴┐├┤  ││├┤ ┌┴┬┘
  ┴  └─┘┴ ┴└─┘─┴┘└─┘┴ └─

  Species Catalog v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
