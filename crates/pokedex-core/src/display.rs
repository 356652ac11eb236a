//! # Display Helpers
//!
//! Pure formatting helpers shared by every presentation surface.
//! Integer arithmetic only.

use serde::{Deserialize, Serialize};

/// Stat value treated as a full bar.
pub const STAT_BAR_MAX: u16 = 200;

/// Upper-case the first character.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Display name: hyphen-separated words, each capitalised.
#[must_use]
pub fn display_name(name: &str) -> String {
    name.split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Coarse bucket for a stat value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatLevel {
    Low,
    Medium,
    High,
}

impl StatLevel {
    /// `>= 100` is high, `>= 60` is medium, anything else is low.
    #[must_use]
    pub const fn of(value: u16) -> Self {
        if value >= 100 {
            Self::High
        } else if value >= 60 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Bar fill for a stat value, as a whole percentage capped at 100.
#[must_use]
pub fn stat_percent(value: u16) -> u8 {
    let percent = u32::from(value) * 100 / u32::from(STAT_BAR_MAX);
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_char() {
        assert_eq!(capitalize("pikachu"), "Pikachu");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn display_name_splits_hyphens() {
        assert_eq!(display_name("mr-mime"), "Mr Mime");
    }

    #[test]
    fn stat_level_buckets() {
        assert_eq!(StatLevel::of(59), StatLevel::Low);
        assert_eq!(StatLevel::of(60), StatLevel::Medium);
        assert_eq!(StatLevel::of(100), StatLevel::High);
    }

    #[test]
    fn stat_percent_caps() {
        assert_eq!(stat_percent(100), 50);
        assert_eq!(stat_percent(255), 100);
    }
}
