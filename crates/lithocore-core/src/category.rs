use serde::{Deserialize, Serialize};

/// Fixed classification buckets used to group localities on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Mines, adits and quarries.
    Official,
    /// Any other find-spot, typically fissures and veins.
    Unofficial,
    /// Authored prospect zones. Never derived from provider data.
    Potential,
    /// Authored reference sites shown for context.
    Background,
    /// Transient results of the current search; cleared on every new search.
    SearchResult,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Official,
        Category::Unofficial,
        Category::Potential,
        Category::Background,
        Category::SearchResult,
    ];

    /// Wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Official => "official",
            Category::Unofficial => "unofficial",
            Category::Potential => "potential",
            Category::Background => "background",
            Category::SearchResult => "searchResult",
        }
    }

    /// Legend label shown next to the layer toggle.
    #[must_use]
    pub fn legend_label(self) -> &'static str {
        match self {
            Category::Official => "Offizielle Fundorte",
            Category::Unofficial => "Inoffizielle Fundorte",
            Category::Potential => "Potenzialzonen",
            Category::Background => "Referenzfundorte",
            Category::SearchResult => "Suchergebnisse",
        }
    }

    /// Default marker fill colour for the category.
    #[must_use]
    pub fn default_color(self) -> &'static str {
        match self {
            Category::Official => "#dc2626",
            Category::Unofficial => "#f59e0b",
            Category::Potential => "#16a34a",
            Category::Background => "#6b7280",
            Category::SearchResult => "#3b82f6",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}
