//! # Core Type Definitions
//!
//! This module contains the record model for the Pokedex catalog:
//! - Record identifiers (`PokemonId`)
//! - Category tags (`PokemonType`, `TypeSet`)
//! - Fixed-point physical measures (`Tenths`)
//! - The six-metric stat block (`Stats`, `StatKind`)
//! - Image locators (`Sprites`)
//! - The assembled record (`Pokemon`)
//! - Error types (`DexError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they key a `BTreeMap`/`BTreeSet`
//! - Never store a value that is a pure function of another field
//!   (generation and region are derived from the id on demand)

use crate::generation::{Generation, Region};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// RECORD IDENTIFIER
// =============================================================================

/// Unique identifier of a catalog record.
///
/// Ids are positive and dense within `[1, N]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PokemonId(pub u32);

impl PokemonId {
    /// Validate a raw id. Zero is not an issued id.
    pub fn new(raw: u32) -> Result<Self, DexError> {
        if raw == 0 {
            return Err(DexError::InvalidId(raw));
        }
        Ok(Self(raw))
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PokemonId {
    /// Catalog notation: `#001`, `#025`, `#1025`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03}", self.0)
    }
}

// =============================================================================
// CATEGORY TAGS
// =============================================================================

/// The fixed enumeration of category tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    /// Every category tag, in canonical order.
    pub const ALL: [Self; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Electric,
        Self::Grass,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    /// Lowercase tag as used by the remote API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Electric => "electric",
            Self::Grass => "grass",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PokemonType {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| DexError::Config(format!("unknown type tag '{}'", s)))
    }
}

/// Ordered, duplicate-free, non-empty set of category tags.
///
/// Order is source order; the first tag is the primary category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PokemonType>", into = "Vec<PokemonType>")]
pub struct TypeSet(Vec<PokemonType>);

impl TypeSet {
    /// Build a set from tags in source order. Returns `None` when empty.
    pub fn new(tags: impl IntoIterator<Item = PokemonType>) -> Option<Self> {
        let mut out: Vec<PokemonType> = Vec::new();
        for tag in tags {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(Self(out))
        }
    }

    /// The primary category (first tag).
    #[must_use]
    pub fn primary(&self) -> PokemonType {
        // Non-empty by construction.
        self.0.first().copied().unwrap_or(PokemonType::Normal)
    }

    /// Check whether a tag is present.
    #[must_use]
    pub fn contains(&self, tag: PokemonType) -> bool {
        self.0.contains(&tag)
    }

    /// Iterate tags in order.
    pub fn iter(&self) -> impl Iterator<Item = PokemonType> + '_ {
        self.0.iter().copied()
    }

    /// Tags as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PokemonType] {
        &self.0
    }
}

impl TryFrom<Vec<PokemonType>> for TypeSet {
    type Error = DexError;

    fn try_from(tags: Vec<PokemonType>) -> Result<Self, Self::Error> {
        Self::new(tags).ok_or_else(|| DexError::Serialization("empty type set".to_string()))
    }
}

impl From<TypeSet> for Vec<PokemonType> {
    fn from(set: TypeSet) -> Self {
        set.0
    }
}

// =============================================================================
// FIXED-POINT MEASURES
// =============================================================================

/// A measure stored in tenths of its display unit.
///
/// The remote API reports height in decimeters and weight in hectograms, so
/// `Tenths(69)` for weight is 6.9 kg. Division by 10 happens only when
/// formatting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Tenths(pub u32);

impl Tenths {
    /// Whole units (truncated).
    #[must_use]
    pub const fn whole(self) -> u32 {
        self.0 / 10
    }

    /// The tenths digit.
    #[must_use]
    pub const fn fraction(self) -> u32 {
        self.0 % 10
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.whole(), self.fraction())
    }
}

// =============================================================================
// STAT BLOCK
// =============================================================================

/// The six named metrics of a stat block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatKind {
    /// All metrics in block order.
    pub const ALL: [Self; 6] = [
        Self::Hp,
        Self::Attack,
        Self::Defense,
        Self::SpecialAttack,
        Self::SpecialDefense,
        Self::Speed,
    ];

    /// Name as used by the remote API.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Hp => "hp",
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::SpecialAttack => "special-attack",
            Self::SpecialDefense => "special-defense",
            Self::Speed => "speed",
        }
    }

    /// Short display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hp => "HP",
            Self::Attack => "ATTACK",
            Self::Defense => "DEFENSE",
            Self::SpecialAttack => "SP. ATK",
            Self::SpecialDefense => "SP. DEF",
            Self::Speed => "SPEED",
        }
    }

    /// Resolve a remote stat name.
    #[must_use]
    pub fn from_api_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.api_name() == name)
    }
}

/// Exactly six integer metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Stats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub special_attack: u16,
    pub special_defense: u16,
    pub speed: u16,
}

impl Stats {
    /// Read one metric.
    #[must_use]
    pub const fn get(&self, kind: StatKind) -> u16 {
        match kind {
            StatKind::Hp => self.hp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::SpecialAttack => self.special_attack,
            StatKind::SpecialDefense => self.special_defense,
            StatKind::Speed => self.speed,
        }
    }

    /// Write one metric.
    pub fn set(&mut self, kind: StatKind, value: u16) {
        match kind {
            StatKind::Hp => self.hp = value,
            StatKind::Attack => self.attack = value,
            StatKind::Defense => self.defense = value,
            StatKind::SpecialAttack => self.special_attack = value,
            StatKind::SpecialDefense => self.special_defense = value,
            StatKind::Speed => self.speed = value,
        }
    }

    /// Sum of all six metrics.
    #[must_use]
    pub fn total(&self) -> u32 {
        StatKind::ALL.iter().map(|&k| u32::from(self.get(k))).sum()
    }

    /// Metrics paired with their kind, in block order.
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, u16)> + '_ {
        StatKind::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}

// =============================================================================
// IMAGES
// =============================================================================

/// Image locators for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Sprites {
    /// Default front sprite.
    pub normal: Option<String>,
    /// Shiny variant.
    pub shiny: Option<String>,
    /// High-resolution official artwork.
    pub artwork: Option<String>,
}

impl Sprites {
    /// Primary display image: artwork, falling back to the default sprite.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.artwork.as_deref().or(self.normal.as_deref())
    }
}

// =============================================================================
// LEGENDARY STATUS
// =============================================================================

/// Rarity classification sourced from remote species flags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LegendaryStatus {
    #[default]
    Normal,
    Legendary,
    Mythical,
}

impl LegendaryStatus {
    /// Legendary wins over mythical when the source sets both flags.
    #[must_use]
    pub const fn from_flags(is_legendary: bool, is_mythical: bool) -> Self {
        if is_legendary {
            Self::Legendary
        } else if is_mythical {
            Self::Mythical
        } else {
            Self::Normal
        }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// One fully assembled catalog record. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: PokemonId,
    /// Lowercase canonical name.
    pub name: String,
    /// Category tags; the first is the primary category.
    pub types: TypeSet,
    /// Height in tenths of a meter.
    pub height: Tenths,
    /// Weight in tenths of a kilogram.
    pub weight: Tenths,
    /// Abilities in source order; the first is the primary ability.
    pub abilities: Vec<String>,
    pub stats: Stats,
    pub sprites: Sprites,
    pub legendary_status: LegendaryStatus,
    /// First English flavor text, whitespace-normalised.
    pub description: String,
    /// First English genus label.
    pub category: String,
    /// De-duplicated hint terms seeded from name and category tags.
    pub search_terms: Vec<String>,
}

impl Pokemon {
    /// The primary category tag.
    #[must_use]
    pub fn primary_type(&self) -> PokemonType {
        self.types.primary()
    }

    /// Generation band this record belongs to (derived from the id).
    #[must_use]
    pub fn generation(&self) -> Generation {
        Generation::of(self.id)
    }

    /// Region tag (derived from the generation).
    #[must_use]
    pub fn region(&self) -> Region {
        self.generation().region()
    }

    /// Primary display image.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.sprites.primary()
    }

    /// Sum of all six stat metrics.
    #[must_use]
    pub fn stat_total(&self) -> u32 {
        self.stats.total()
    }
}

/// Build the search hint terms for a record.
///
/// The list keeps first-seen order and drops duplicates.
#[must_use]
pub fn search_terms(name: &str, types: &TypeSet) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let candidates = [name.to_string(), name.to_lowercase()]
        .into_iter()
        .chain(types.iter().map(|t| t.as_str().to_string()));
    for term in candidates {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Pokedex system.
///
/// - No error in this subsystem is fatal to the process
/// - `StorageWrite` is recovered inside the record store and never surfaces
///   from `RecordStore::put`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DexError {
    /// The remote API has no entity for this id.
    #[error("Pokemon not found: {0}")]
    NotFound(PokemonId),

    /// Any other non-success transport or response outcome.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A generation index outside 1-9.
    #[error("Invalid generation: {0}")]
    InvalidGeneration(u8),

    /// Zero or otherwise unissued id.
    #[error("Invalid id: {0}")]
    InvalidId(u32),

    /// An id range starting at zero, with `start > end`, or wider than the catalog.
    #[error("Invalid range: {start}..={end}")]
    InvalidRange { start: u32, end: u32 },

    /// A durable cache write failed (quota, I/O). Recovered silently.
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// The durable backend could not be opened or read.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encoding or decoding of a cache entry failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// Socket or file I/O outside the durable cache.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
