//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Pokedex core.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! The search defaults can be overridden per call through `SearchOptions`.

/// Durable cache namespace.
///
/// Every durable key starts with this prefix. Bump the version suffix on any
/// change to the entry encoding so old entries are never decoded as new ones.
pub const CACHE_KEY_PREFIX: &str = "pokemon_cache_v1";

/// Time-to-live of a durable cache entry: 7 days, in milliseconds.
pub const CACHE_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Highest id covered by the generation bands.
pub const MAX_POKEMON_ID: u32 = 1025;

/// Description used when the species has no English flavor text.
pub const DEFAULT_DESCRIPTION: &str = "A mysterious Pokemon with unique characteristics.";

/// Genus label used when the species has no English genus.
pub const DEFAULT_CATEGORY: &str = "Unknown Pokemon";

/// Language code of the text entries we keep.
pub const TEXT_LANGUAGE: &str = "en";

// =============================================================================
// FUZZY SEARCH
// =============================================================================

/// Scale of dissimilarity scores: 0 is exact, `SCORE_SCALE` matches anything.
pub const SCORE_SCALE: u32 = 1000;

/// Default similarity threshold in per-mille (0.3).
///
/// A field matches when `edits * SCORE_SCALE <= threshold * query_len`, which
/// tolerates one typo from four characters and two from seven.
pub const DEFAULT_SEARCH_THRESHOLD: u32 = 300;

/// Default cap on fuzzy results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Queries shorter than this (in chars, after trimming) are not searched.
pub const MIN_MATCH_CHAR_LENGTH: usize = 2;

/// Queries longer than this (in chars) are truncated before matching.
pub const MAX_PATTERN_CHARS: usize = 32;

/// Field weights in half-units: name 2.0, category tags 1.0, abilities 0.5.
pub const NAME_WEIGHT: u32 = 4;
pub const TYPE_WEIGHT: u32 = 2;
pub const ABILITY_WEIGHT: u32 = 1;
