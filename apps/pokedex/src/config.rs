//! # Configuration
//!
//! Layered settings, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config <path>`, else `pokedex.toml` in the working
//!    directory when present
//! 3. Environment: `POKEDEX_API_URL`, `POKEDEX_CACHE_PATH`
//! 4. CLI flags (applied by the CLI layer)
//!
//! ```toml
//! [api]
//! base_url = "https://pokeapi.co/api/v2"
//!
//! [cache]
//! path = "pokedex-cache.redb"
//! memory_only = false
//!
//! [search]
//! threshold = 300
//! limit = 50
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [load]
//! generations = [1, 2, 3]
//! ```

use pokedex_core::{DexError, Generation, MemoryStore, RecordStore, RedbStore, SearchOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "pokedex.toml";

pub const ENV_API_URL: &str = "POKEDEX_API_URL";
pub const ENV_CACHE_PATH: &str = "POKEDEX_CACHE_PATH";

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
    /// Keep the durable tier in memory instead of on disk.
    pub memory_only: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pokedex-cache.redb"),
            memory_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Per-mille dissimilarity threshold.
    pub threshold: u32,
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let options = SearchOptions::default();
        Self {
            threshold: options.threshold,
            limit: options.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Bands loaded by progressive population, in order.
    pub generations: Vec<Generation>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            generations: Generation::all().collect(),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub load: LoadConfig,
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, DexError> {
        toml::from_str(content).map_err(|e| DexError::Config(e.to_string()))
    }

    /// Load defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist. Without one, `pokedex.toml` is read
    /// only if it is present.
    pub fn load(path: Option<&Path>) -> Result<Self, DexError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, DexError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DexError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(path) = lookup(ENV_CACHE_PATH).filter(|v| !v.trim().is_empty()) {
            self.cache.path = PathBuf::from(path);
        }
    }

    /// Search options for the query engine.
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            threshold: self.search.threshold,
            limit: self.search.limit,
            ..SearchOptions::default()
        }
    }

    /// Open the record store this configuration selects.
    pub fn open_store(&self) -> Result<Arc<RecordStore>, DexError> {
        let store = if self.cache.memory_only {
            RecordStore::new(Arc::new(MemoryStore::new()))
        } else {
            RecordStore::new(Arc::new(RedbStore::open(&self.cache.path)?))
        };
        Ok(Arc::new(store))
    }

    /// `host:port` the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://pokeapi.co/api/v2");
        assert_eq!(config.search.threshold, 300);
        assert_eq!(config.search.limit, 50);
        assert_eq!(config.load.generations.len(), 9);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [search]
            limit = 10

            [load]
            generations = [1, 4]
            "#,
        )
        .expect("parse");

        assert_eq!(config.search.limit, 10);
        assert_eq!(config.search.threshold, 300);
        assert_eq!(
            config.load.generations,
            vec![
                Generation::new(1).expect("valid"),
                Generation::new(4).expect("valid")
            ]
        );
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn out_of_range_generation_rejected() {
        let result = Config::from_toml("[load]\ngenerations = [10]\n");
        assert!(matches!(result, Err(DexError::Config(_))));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::from_toml("[api]\nbase_url = \"http://file\"\n").expect("parse");
        config.apply_env(|key| match key {
            ENV_API_URL => Some("http://env".to_string()),
            ENV_CACHE_PATH => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.api.base_url, "http://env");
        assert_eq!(config.cache.path, PathBuf::from("pokedex-cache.redb"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        let result = Config::load(Some(missing.as_path()));
        assert!(matches!(result, Err(DexError::Config(_))));
    }

    #[test]
    fn memory_store_selected() {
        let config = Config {
            cache: CacheConfig {
                memory_only: true,
                ..CacheConfig::default()
            },
            ..Config::default()
        };
        let store = config.open_store().expect("open");
        assert_eq!(store.stats().durable_count, 0);
    }
}
