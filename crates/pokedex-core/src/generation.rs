//! # Generation Bands
//!
//! Fixed, contiguous, non-overlapping id bands. Each band is one historical
//! release ("generation") and maps 1:1 to a region tag.
//!
//! `Generation::of` is total over every issued id: ids past the last band's
//! upper bound still belong to the last band, so a newly issued id never
//! falls into a gap.

use crate::{DexError, PokemonId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Region tag, one per generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Kanto,
    Johto,
    Hoenn,
    Sinnoh,
    Unova,
    Kalos,
    Alola,
    Galar,
    Paldea,
}

impl Region {
    /// Lowercase region name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kanto => "kanto",
            Self::Johto => "johto",
            Self::Hoenn => "hoenn",
            Self::Sinnoh => "sinnoh",
            Self::Unova => "unova",
            Self::Kalos => "kalos",
            Self::Alola => "alola",
            Self::Galar => "galar",
            Self::Paldea => "paldea",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band table: (region, first id, last id), in generation order.
pub const GENERATION_BANDS: [(Region, u32, u32); 9] = [
    (Region::Kanto, 1, 151),
    (Region::Johto, 152, 251),
    (Region::Hoenn, 252, 386),
    (Region::Sinnoh, 387, 493),
    (Region::Unova, 494, 649),
    (Region::Kalos, 650, 721),
    (Region::Alola, 722, 809),
    (Region::Galar, 810, 905),
    (Region::Paldea, 906, 1025),
];

/// A generation index in `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Generation(u8);

impl Generation {
    /// Number of generations.
    pub const COUNT: u8 = GENERATION_BANDS.len() as u8;

    /// Validate a generation index.
    pub fn new(index: u8) -> Result<Self, DexError> {
        if (1..=Self::COUNT).contains(&index) {
            Ok(Self(index))
        } else {
            Err(DexError::InvalidGeneration(index))
        }
    }

    /// Derive the generation of an id. Total for every id.
    #[must_use]
    pub fn of(id: PokemonId) -> Self {
        let position = GENERATION_BANDS
            .iter()
            .position(|&(_, _, last)| id.0 <= last)
            .unwrap_or(GENERATION_BANDS.len() - 1);
        Self(position as u8 + 1)
    }

    /// All generations, ascending.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::COUNT).map(Self)
    }

    /// The raw index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The region tag of this generation.
    #[must_use]
    pub const fn region(self) -> Region {
        GENERATION_BANDS[(self.0 - 1) as usize].0
    }

    /// Inclusive id band of this generation.
    #[must_use]
    pub const fn band(self) -> RangeInclusive<u32> {
        let (_, first, last) = GENERATION_BANDS[(self.0 - 1) as usize];
        first..=last
    }
}

impl TryFrom<u8> for Generation {
    type Error = DexError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<Generation> for u8 {
    fn from(generation: Generation) -> Self {
        generation.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Roman numeral label for a generation, as shown in the catalog header.
#[must_use]
pub const fn roman(generation: Generation) -> &'static str {
    match generation.0 {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        6 => "VI",
        7 => "VII",
        8 => "VIII",
        _ => "IX",
    }
}

// =============================================================================
// TESTS
// =============================================================================
