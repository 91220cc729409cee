//! Weather-aware outfit pre-selection.
//!
//! Before anything is sent to the LLM (and whenever its answer is unusable) outfits are
//! narrowed to the current temperature bracket and ordered least-recently-worn first.

use crate::entities::outfit;
use serde::Serialize;

/// Number of outfits offered per daily suggestion
pub const DAILY_CANDIDATES: usize = 3;

/// One of three temperature ranges used to pick season-appropriate outfits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherBracket {
    /// Below 10 °C
    Cold,
    /// 10 °C up to (not including) 20 °C
    Mild,
    /// 20 °C and above
    Warm,
}

impl WeatherBracket {
    /// Classifies a temperature in °C. Every value lands in exactly one bracket;
    /// NaN compares false everywhere and ends up in `Warm`.
    #[must_use]
    pub fn from_temperature(celsius: f64) -> Self {
        if celsius < 10.0 {
            Self::Cold
        } else if celsius < 20.0 {
            Self::Mild
        } else {
            Self::Warm
        }
    }

    /// Season tags that suit this bracket
    #[must_use]
    pub const fn seasons(self) -> [&'static str; 2] {
        match self {
            Self::Cold => ["winter", "fall"],
            Self::Mild => ["spring", "fall"],
            Self::Warm => ["summer", "spring"],
        }
    }

    /// Label used in prompts and insights
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Mild => "mild",
            Self::Warm => "warm",
        }
    }

    /// Whether the outfit's season tags fit this bracket (`all-season` always fits)
    #[must_use]
    pub fn admits(self, outfit: &outfit::Model) -> bool {
        outfit.seasons.contains("all-season")
            || self.seasons().iter().any(|s| outfit.seasons.contains(s))
    }
}

/// Orders outfits never-worn first, then by oldest `last_worn`; ties by id.
pub fn sort_least_recently_worn(outfits: &mut [outfit::Model]) {
    outfits.sort_by(|a, b| a.last_worn.cmp(&b.last_worn).then(a.id.cmp(&b.id)));
}

/// Picks up to `limit` outfits for `temperature`.
///
/// Outfits outside the bracket are dropped unless none fit, in which case the whole
/// wardrobe is ranked instead.
#[must_use]
pub fn select_candidates(
    outfits: Vec<outfit::Model>,
    temperature: f64,
    limit: usize,
) -> Vec<outfit::Model> {
    let bracket = WeatherBracket::from_temperature(temperature);
    let (mut fitting, rest): (Vec<_>, Vec<_>) =
        outfits.into_iter().partition(|o| bracket.admits(o));

    if fitting.is_empty() {
        fitting = rest;
    }

    sort_least_recently_worn(&mut fitting);
    fitting.truncate(limit);
    fitting
}
