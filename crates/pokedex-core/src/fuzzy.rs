//! # Fuzzy Matcher
//!
//! Typo-tolerant matching of a query against three weighted record fields:
//! name, category tags and abilities.
//!
//! - Matching is approximate-substring: the query may match anywhere in a
//!   field, and its position does not affect the score
//! - Scores are per-mille dissimilarities (0 = exact), integer only
//! - A field matches when `edits * SCORE_SCALE <= threshold * query_chars`
//!
//! ## Record score
//!
//! Each field contributes its similarity (`SCORE_SCALE - dissimilarity`)
//! scaled by its weight; unmatched fields contribute nothing. The record
//! score is `SCORE_SCALE` minus the weighted similarity averaged over all
//! weights, so a name hit always outranks an equally close ability hit.

use crate::Pokemon;
use crate::primitives::{
    ABILITY_WEIGHT, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_THRESHOLD, MAX_PATTERN_CHARS,
    MIN_MATCH_CHAR_LENGTH, NAME_WEIGHT, SCORE_SCALE, TYPE_WEIGHT,
};
use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the fuzzy stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum accepted dissimilarity, per-mille.
    pub threshold: u32,
    /// Maximum number of fuzzy results.
    pub limit: usize,
    /// Shortest query (in chars) that is searched at all.
    pub min_match_len: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SEARCH_THRESHOLD,
            limit: DEFAULT_SEARCH_LIMIT,
            min_match_len: MIN_MATCH_CHAR_LENGTH,
        }
    }
}

/// Minimum Levenshtein distance between `pattern` and any substring of
/// `text`, or `None` when it exceeds `max_edits`.
///
/// Only windows within `max_edits` of the pattern length can stay under the
/// cutoff, so those are the only ones compared.
#[must_use]
pub fn substring_distance(pattern: &[char], text: &[char], max_edits: usize) -> Option<usize> {
    let m = pattern.len();
    if m == 0 {
        return Some(0);
    }

    let args = levenshtein::Args::default().score_cutoff(max_edits);
    let shortest = m.saturating_sub(max_edits);
    let longest = (m + max_edits).min(text.len());

    // The empty substring costs `m` deletions
    let mut best = (m <= max_edits).then_some(m);
    for len in shortest.max(1)..=longest {
        for window in text.windows(len) {
            let Some(edits) = levenshtein::distance_with_args(
                pattern.iter().copied(),
                window.iter().copied(),
                &args,
            ) else {
                continue;
            };
            if edits == 0 {
                return Some(0);
            }
            best = Some(best.map_or(edits, |b| b.min(edits)));
        }
    }
    best
}

/// A lowercased query ready for matching.
#[derive(Debug, Clone)]
pub struct Pattern {
    chars: Vec<char>,
    threshold: u32,
}

impl Pattern {
    /// Prepare a query. Returns `None` when it is shorter than
    /// `options.min_match_len` characters. Only the first
    /// `MAX_PATTERN_CHARS` characters are kept.
    #[must_use]
    pub fn new(query: &str, options: &SearchOptions) -> Option<Self> {
        let chars: Vec<char> = query
            .trim()
            .to_lowercase()
            .chars()
            .take(MAX_PATTERN_CHARS)
            .collect();
        if chars.len() < options.min_match_len.max(1) {
            return None;
        }
        Some(Self {
            chars,
            threshold: options.threshold,
        })
    }

    /// Dissimilarity against one text, or `None` above the threshold.
    #[must_use]
    pub fn score(&self, text: &str) -> Option<u32> {
        let text: Vec<char> = text.to_lowercase().chars().collect();
        let len = self.chars.len() as u32;
        // edits * SCORE_SCALE <= threshold * len
        let max_edits = (self.threshold.saturating_mul(len) / SCORE_SCALE) as usize;
        let edits = substring_distance(&self.chars, &text, max_edits)? as u32;
        Some((edits * SCORE_SCALE / len).min(SCORE_SCALE))
    }

    /// Best dissimilarity across several texts.
    pub fn best_score<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> Option<u32> {
        texts.into_iter().filter_map(|t| self.score(t)).min()
    }

    /// Weighted record score, or `None` when no field matches.
    #[must_use]
    pub fn score_record(&self, record: &Pokemon) -> Option<u32> {
        let fields = [
            (NAME_WEIGHT, self.score(&record.name)),
            (TYPE_WEIGHT, self.best_score(record.types.iter().map(|t| t.as_str()))),
            (
                ABILITY_WEIGHT,
                self.best_score(record.abilities.iter().map(String::as_str)),
            ),
        ];

        let total_weight = NAME_WEIGHT + TYPE_WEIGHT + ABILITY_WEIGHT;
        let mut similarity = 0u32;
        let mut matched = false;
        for (weight, score) in fields {
            if let Some(score) = score {
                matched = true;
                similarity += weight * (SCORE_SCALE - score);
            }
        }

        matched.then(|| SCORE_SCALE - similarity / total_weight)
    }
}

/// A fuzzy hit: the record and its dissimilarity score.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub record: &'a Pokemon,
    pub score: u32,
}

/// Search `records`, best match first, capped at `options.limit`.
///
/// Equal scores keep input order. Returns `None` when the query is too
/// short to search.
pub fn search<'a>(
    records: impl IntoIterator<Item = &'a Pokemon>,
    query: &str,
    options: &SearchOptions,
) -> Option<Vec<Scored<'a>>> {
    let pattern = Pattern::new(query, options)?;

    let mut hits: Vec<Scored<'a>> = records
        .into_iter()
        .filter_map(|record| {
            pattern
                .score_record(record)
                .map(|score| Scored { record, score })
        })
        .collect();

    hits.sort_by_key(|hit| hit.score);
    hits.truncate(options.limit);
    Some(hits)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LegendaryStatus, PokemonId, PokemonType, Sprites, Stats, Tenths, TypeSet};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn record(id: u32, name: &str, types: &[PokemonType], abilities: &[&str]) -> Pokemon {
        let types = TypeSet::new(types.iter().copied()).expect("non-empty");
        Pokemon {
            id: PokemonId(id),
            name: name.to_string(),
            search_terms: Vec::new(),
            types,
            height: Tenths(10),
            weight: Tenths(100),
            abilities: abilities.iter().map(|a| a.to_string()).collect(),
            stats: Stats::default(),
            sprites: Sprites::default(),
            legendary_status: LegendaryStatus::Normal,
            description: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn distance_exact_substring_is_zero() {
        assert_eq!(substring_distance(&chars("chu"), &chars("pikachu"), 1), Some(0));
    }

    #[test]
    fn distance_counts_one_substitution() {
        assert_eq!(
            substring_distance(&chars("pikuchu"), &chars("pikachu"), 2),
            Some(1)
        );
    }

    #[test]
    fn distance_finds_best_window_inside_longer_text() {
        // "mandr" sits inside "charmander" one insertion away
        assert_eq!(
            substring_distance(&chars("mandr"), &chars("charmander"), 1),
            Some(1)
        );
        assert_eq!(
            substring_distance(&chars("charmandr"), &chars("charizard"), 2),
            None
        );
    }

    #[test]
    fn distance_against_empty_text_is_pattern_len() {
        assert_eq!(substring_distance(&chars("abc"), &[], 3), Some(3));
        assert_eq!(substring_distance(&chars("abc"), &[], 2), None);
    }

    #[test]
    fn distance_above_cutoff_is_none() {
        assert_eq!(substring_distance(&chars("pxkxcxu"), &chars("pikachu"), 2), None);
    }

    #[test]
    fn long_query_is_truncated() {
        let long = "abcdefgh".repeat(8);
        let head: String = long.chars().take(MAX_PATTERN_CHARS).collect();
        let pattern = Pattern::new(&long, &SearchOptions::default()).expect("long enough");
        // Untruncated, 32 missing chars over 64 would exceed the threshold
        assert_eq!(pattern.score(&head), Some(0));
    }

    #[test]
    fn typo_within_threshold_matches() {
        let pattern = Pattern::new("pikuchu", &SearchOptions::default()).expect("long enough");
        // 1 edit over 7 chars = 142 per-mille
        assert_eq!(pattern.score("pikachu"), Some(142));
    }

    #[test]
    fn too_many_edits_rejected() {
        let pattern = Pattern::new("pxkxcxu", &SearchOptions::default()).expect("long enough");
        assert_eq!(pattern.score("pikachu"), None);
    }

    #[test]
    fn short_query_is_not_a_pattern() {
        assert!(Pattern::new("p", &SearchOptions::default()).is_none());
        assert!(Pattern::new("  p  ", &SearchOptions::default()).is_none());
        assert!(Pattern::new("pi", &SearchOptions::default()).is_some());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let pattern = Pattern::new("PIKA", &SearchOptions::default()).expect("long enough");
        assert_eq!(pattern.score("Pikachu"), Some(0));
    }

    #[test]
    fn name_hit_outranks_ability_hit() {
        let by_name = record(1, "static", &[PokemonType::Normal], &["run-away"]);
        let by_ability = record(2, "pikachu", &[PokemonType::Electric], &["static"]);
        let records = [by_ability.clone(), by_name.clone()];

        let hits = search(records.iter(), "static", &SearchOptions::default()).expect("searched");
        let ids: Vec<u32> = hits.iter().map(|h| h.record.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn type_tags_are_searched() {
        let charmander = record(4, "charmander", &[PokemonType::Fire], &["blaze"]);
        let squirtle = record(7, "squirtle", &[PokemonType::Water], &["torrent"]);
        let records = [charmander, squirtle];

        let hits = search(records.iter(), "fire", &SearchOptions::default()).expect("searched");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.id, PokemonId(4));
    }

    #[test]
    fn results_are_capped() {
        let records: Vec<Pokemon> = (1..=10)
            .map(|i| record(i, &format!("mon{}", i), &[PokemonType::Bug], &[]))
            .collect();
        let options = SearchOptions {
            limit: 3,
            ..SearchOptions::default()
        };

        let hits = search(records.iter(), "mon", &options).expect("searched");
        assert_eq!(hits.len(), 3);
        // Equal scores keep input order
        assert_eq!(hits[0].record.id, PokemonId(1));
        assert_eq!(hits[2].record.id, PokemonId(3));
    }
}
