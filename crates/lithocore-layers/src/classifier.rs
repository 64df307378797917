//! Name-based locality classification.
//!
//! The lexicon rule is a coarse placeholder for real provenance data. It is
//! kept behind [`LocalityClassifier`] so a metadata-backed strategy can
//! replace it without touching the session controller.

use std::sync::LazyLock;

use lithocore_core::{Category, NormalizedLocality};
use regex::Regex;
use serde::Serialize;

pub const OFFICIAL_EXPLANATION: &str =
    "formed via hydrothermal processes associated with the local intrusive massif";
pub const UNOFFICIAL_EXPLANATION: &str = "a typical fissure/vein mineral of this region";
pub const POTENTIAL_EXPLANATION: &str =
    "authored prospect zone; not derived from geological survey data";
pub const BACKGROUND_EXPLANATION: &str = "reference locality shown for context";
pub const SEARCH_RESULT_EXPLANATION: &str = "result of the current search";

/// Mine, adit/tunnel and quarry tokens in German, English, Italian and French.
///
/// German terms match inside compounds (`Kalksteinbruch`, `Basistunnel`);
/// the short foreign terms need word boundaries so `mine` does not match
/// `Mineral`.
static WORKINGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:bergwerk|stollen|steinbruch|tunnel|grube)|\b(?:mines?|mining|adits?|quarr(?:y|ies)|open[- ]pit|miniera|miniere|cava|galleria|carri[eè]res?|mini[eè]res?)\b",
    )
    .expect("valid workings regex")
});

/// Fixed explanation text for a category.
#[must_use]
pub fn explanation_for(category: Category) -> &'static str {
    match category {
        Category::Official => OFFICIAL_EXPLANATION,
        Category::Unofficial => UNOFFICIAL_EXPLANATION,
        Category::Potential => POTENTIAL_EXPLANATION,
        Category::Background => BACKGROUND_EXPLANATION,
        Category::SearchResult => SEARCH_RESULT_EXPLANATION,
    }
}

/// Strategy assigning a category to a locality by its name.
///
/// Implementations must be deterministic and must only return
/// [`Category::Official`] or [`Category::Unofficial`].
pub trait LocalityClassifier: Send + Sync {
    fn category_for(&self, name: &str) -> Category;
}

/// Default strategy: names that look like mine workings are official.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LocalityClassifier for LexiconClassifier {
    fn category_for(&self, name: &str) -> Category {
        if WORKINGS.is_match(name) {
            Category::Official
        } else {
            Category::Unofficial
        }
    }
}

/// A normalized locality with its category and explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedLocality {
    pub locality: NormalizedLocality,
    pub category: Category,
    pub explanation: &'static str,
}

#[must_use]
pub fn classify<C: LocalityClassifier + ?Sized>(
    locality: NormalizedLocality,
    classifier: &C,
) -> ClassifiedLocality {
    let category = classifier.category_for(&locality.name);
    ClassifiedLocality {
        locality,
        category,
        explanation: explanation_for(category),
    }
}

#[cfg(test)]
mod tests {
    use lithocore_core::DESCRIPTION_PLACEHOLDER;

    use super::*;

    fn category(name: &str) -> Category {
        LexiconClassifier.category_for(name)
    }

    #[test]
    fn workings_are_official() {
        for name in [
            "Quarz-Stollen",
            "Bergwerk Gonzen",
            "Steinbruch Lägern",
            "Kalksteinbruch Mellikon",
            "Gotthard-Basistunnel",
            "Lengenbach quarry",
            "Old Fluorite Mine",
            "Miniera di Gorno",
            "Carrière de Saint-Triphon",
            "Grube Clara",
        ] {
            assert_eq!(category(name), Category::Official, "{name}");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(category("QUARZ-STOLLEN"), Category::Official);
        assert_eq!(category("steinbruch"), Category::Official);
        assert_eq!(category("Alte MINE"), Category::Official);
    }

    #[test]
    fn other_names_are_unofficial() {
        for name in [
            "Alpweide",
            "Grimsel Kristallkluft",
            "Val Giuv",
            "Mineralienfundstelle Binn",
            "Cavardiras",
            "",
        ] {
            assert_eq!(category(name), Category::Unofficial, "{name}");
        }
    }

    #[test]
    fn classify_attaches_category_explanation() {
        let locality = NormalizedLocality {
            id: 1,
            name: "Quarz-Stollen".to_string(),
            coordinate: None,
            description: DESCRIPTION_PLACEHOLDER.to_string(),
            country: None,
            raw_status: None,
        };
        let classified = classify(locality, &LexiconClassifier);
        assert_eq!(classified.category, Category::Official);
        assert_eq!(classified.explanation, OFFICIAL_EXPLANATION);
    }

    #[test]
    fn every_category_has_an_explanation() {
        for category in Category::ALL {
            assert!(!explanation_for(category).is_empty());
        }
    }
}
