// src/model.rs
//! Core data model: raw feed items, finished articles, the closed category
//! set, and stable content ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed category enumeration. Every produced article carries exactly one of
/// these values; unknown classifier output is normalized to `Other` at the
/// parse boundary, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PoliticsEconomy,
    Social,
    World,
    Sports,
    Screen,
    Culture,
    Fun,
    Other,
}

impl Category {
    /// Every category, in presentation order. The output map always contains
    /// one key per entry.
    pub const ALL: [Category; 8] = [
        Category::PoliticsEconomy,
        Category::Social,
        Category::World,
        Category::Sports,
        Category::Screen,
        Category::Culture,
        Category::Fun,
        Category::Other,
    ];

    /// Categories with a min/max quota. `Other` is an overflow bucket and is
    /// never backfilled.
    pub const QUOTA_TARGETS: [Category; 7] = [
        Category::PoliticsEconomy,
        Category::Social,
        Category::World,
        Category::Sports,
        Category::Screen,
        Category::Culture,
        Category::Fun,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::PoliticsEconomy => "politics_economy",
            Category::Social => "social",
            Category::World => "world",
            Category::Sports => "sports",
            Category::Screen => "screen",
            Category::Culture => "culture",
            Category::Fun => "fun",
            Category::Other => "other",
        }
    }

    pub fn from_key(s: &str) -> Option<Category> {
        match s {
            "politics_economy" => Some(Category::PoliticsEconomy),
            "social" => Some(Category::Social),
            "world" => Some(Category::World),
            "sports" => Some(Category::Sports),
            "screen" => Some(Category::Screen),
            "culture" => Some(Category::Culture),
            "fun" => Some(Category::Fun),
            "other" => Some(Category::Other),
            _ => None,
        }
    }

    /// Loose mapping of feed-provided category labels (Greek or English) to
    /// the closed set. Unrecognized labels yield `None` and are ignored.
    pub fn from_hint(raw: &str) -> Option<Category> {
        let label = raw.trim().to_lowercase();
        if let Some(cat) = Category::from_key(&label) {
            return Some(cat);
        }
        match label.as_str() {
            "πολιτική" | "πολιτικη" | "οικονομία" | "οικονομια" | "politics" | "economy" => {
                Some(Category::PoliticsEconomy)
            }
            "κοινωνία" | "κοινωνια" | "ελλάδα" | "ελλαδα" | "υγεία" | "υγεια" | "παιδεία"
            | "παιδεια" | "society" | "greece" => Some(Category::Social),
            "κόσμος" | "κοσμος" | "διεθνή" | "διεθνη" | "international" => Some(Category::World),
            "αθλητικά" | "αθλητικα" | "σπορ" | "sport" => Some(Category::Sports),
            "τηλεόραση" | "τηλεοραση" | "σινεμά" | "σινεμα" | "media" | "tv" | "cinema" => {
                Some(Category::Screen)
            }
            "πολιτισμός" | "πολιτισμος" | "τέχνες" | "τεχνες" | "arts" => Some(Category::Culture),
            "lifestyle" | "ψυχαγωγία" | "ψυχαγωγια" | "διασκέδαση" | "διασκεδαση" => {
                Some(Category::Fun)
            }
            _ => None,
        }
    }

    /// Search term used for best-effort stock imagery.
    pub fn image_query(self) -> &'static str {
        match self {
            Category::PoliticsEconomy => "parliament building",
            Category::Social => "city street people",
            Category::World => "world map globe",
            Category::Sports => "stadium sports",
            Category::Screen => "cinema television",
            Category::Culture => "museum theater",
            Category::Fun => "festival celebration",
            Category::Other => "newspaper",
        }
    }
}

/// One ingested feed entry. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub id: String,
    pub source_name: String,
    pub source_url: String,
    pub title: String,
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub category_hints: Vec<Category>,
}

/// A single contributing source of a finished article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub title: String,
    pub url: String,
}

/// A classified, simplified article ready for the output artifact.
/// One topic cluster yields at most one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedArticle {
    pub id: String,
    pub title: String,
    pub simple_title: String,
    pub simple_text: String,
    pub category: Category,
    pub category_reason: String,
    pub sources: Vec<ArticleSource>,
    pub source_domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub is_sensitive: bool,
}

impl FinishedArticle {
    /// Canonical URL used for duplicate suppression: the first source link.
    pub fn canonical_url(&self) -> Option<&str> {
        self.sources.first().map(|s| s.url.as_str())
    }
}

/// Stable short id: SHA-256 over the given parts, truncated to 12 hex chars.
/// Deterministic for a fixed part sequence.
pub fn stable_id<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref().as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_id_is_deterministic_and_short() {
        let a = stable_id(["https://x.gr/feed", "Τίτλος", "2025-01-01"]);
        let b = stable_id(["https://x.gr/feed", "Τίτλος", "2025-01-01"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn stable_id_is_separator_safe() {
        // ("ab", "c") must not collide with ("a", "bc").
        assert_ne!(stable_id(["ab", "c"]), stable_id(["a", "bc"]));
    }

    #[test]
    fn category_round_trips_through_keys() {
        for cat in Category::ALL {
            assert_eq!(Category::from_key(cat.key()), Some(cat));
        }
        assert_eq!(Category::from_key("nonsense"), None);
    }

    #[test]
    fn category_hints_map_greek_labels() {
        assert_eq!(Category::from_hint("ΑΘΛΗΤΙΚΑ"), Some(Category::Sports));
        assert_eq!(Category::from_hint(" Κοινωνία "), Some(Category::Social));
        assert_eq!(Category::from_hint("sports"), Some(Category::Sports));
        assert_eq!(Category::from_hint("χρονογράφημα"), None);
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::PoliticsEconomy).unwrap();
        assert_eq!(json, "\"politics_economy\"");
    }
}
