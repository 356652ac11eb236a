//! # Remote Payload Schema
//!
//! Typed views of the two remote documents a record is assembled from:
//! the primary entity (`/pokemon/{id}`) and its species metadata (the URL
//! embedded in the entity). Only the fields the record needs are modelled;
//! everything else in the payload is ignored.
//!
//! Assembly is a pure transformation: no I/O happens here. The app layer
//! performs the two requests and hands both payloads to [`assemble`].

use crate::primitives::{DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, TEXT_LANGUAGE};
use crate::types::search_terms;
use crate::{
    DexError, LegendaryStatus, Pokemon, PokemonId, PokemonType, Sprites, StatKind, Stats, Tenths,
    TypeSet,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// SHARED SHAPES
// =============================================================================

/// A `{ name, url }` reference as used throughout the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

// =============================================================================
// PRIMARY ENTITY
// =============================================================================

/// The primary entity document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonPayload {
    pub id: u32,
    pub name: String,
    /// Decimeters.
    pub height: u32,
    /// Hectograms.
    pub weight: u32,
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub sprites: SpritesPayload,
    pub species: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSlot {
    pub base_stat: u16,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpritesPayload {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<ArtworkSprites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtworkSprites {
    pub front_default: Option<String>,
}

// =============================================================================
// SPECIES METADATA
// =============================================================================

/// The species metadata document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesPayload {
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    pub genera: Vec<GenusEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
    #[serde(default)]
    pub version: Option<NamedResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenusEntry {
    pub genus: String,
    pub language: NamedResource,
}

// =============================================================================
// ASSEMBLY
// =============================================================================

/// Collapse control characters and whitespace runs into single spaces.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    raw.split(|c: char| c.is_control() || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merge the primary entity and its species metadata into one record.
///
/// Fails with `DexError::Upstream` when the entity is structurally unusable
/// (no types, unknown type tag, missing stat). Nothing partial is returned.
pub fn assemble(entity: &PokemonPayload, species: &SpeciesPayload) -> Result<Pokemon, DexError> {
    let id = PokemonId::new(entity.id)
        .map_err(|_| DexError::Upstream(format!("entity has invalid id {}", entity.id)))?;

    let tags = entity
        .types
        .iter()
        .map(|slot| {
            slot.kind.name.parse::<PokemonType>().map_err(|_| {
                DexError::Upstream(format!(
                    "entity {} has unknown type tag '{}'",
                    entity.id, slot.kind.name
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let types = TypeSet::new(tags)
        .ok_or_else(|| DexError::Upstream(format!("entity {} has no types", entity.id)))?;

    let mut stats = Stats::default();
    for kind in StatKind::ALL {
        let value = entity
            .stats
            .iter()
            .find(|slot| slot.stat.name == kind.api_name())
            .map(|slot| slot.base_stat)
            .ok_or_else(|| {
                DexError::Upstream(format!(
                    "entity {} is missing stat '{}'",
                    entity.id,
                    kind.api_name()
                ))
            })?;
        stats.set(kind, value);
    }

    let description = species
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == TEXT_LANGUAGE)
        .map(|entry| normalize_text(&entry.flavor_text))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let category = species
        .genera
        .iter()
        .find(|genus| genus.language.name == TEXT_LANGUAGE)
        .map(|genus| genus.genus.clone())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let sprites = Sprites {
        normal: entity.sprites.front_default.clone(),
        shiny: entity.sprites.front_shiny.clone(),
        artwork: entity
            .sprites
            .other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|art| art.front_default.clone()),
    };

    let search_terms = search_terms(&entity.name, &types);

    Ok(Pokemon {
        id,
        name: entity.name.to_lowercase(),
        types,
        height: Tenths(entity.height),
        weight: Tenths(entity.weight),
        abilities: entity
            .abilities
            .iter()
            .map(|slot| slot.ability.name.clone())
            .collect(),
        stats,
        sprites,
        legendary_status: LegendaryStatus::from_flags(species.is_legendary, species.is_mythical),
        description,
        category,
        search_terms,
    })
}

/// One English flavor text with the game version it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorText {
    /// Version label, e.g. `Fire red`.
    pub version: String,
    pub text: String,
}

/// Up to `max` distinct English flavor texts, in source order.
#[must_use]
pub fn flavor_texts(species: &SpeciesPayload, max: usize) -> Vec<FlavorText> {
    let mut out: Vec<FlavorText> = Vec::new();
    for entry in &species.flavor_text_entries {
        if out.len() >= max {
            break;
        }
        if entry.language.name != TEXT_LANGUAGE {
            continue;
        }
        let text = normalize_text(&entry.flavor_text);
        if out.iter().any(|seen| seen.text == text) {
            continue;
        }
        let version = entry
            .version
            .as_ref()
            .map(|v| crate::display::capitalize(&v.name.replacen('-', " ", 1)))
            .unwrap_or_default();
        out.push(FlavorText { version, text });
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
