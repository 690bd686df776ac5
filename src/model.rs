// src/model.rs
//! Record shapes per pipeline stage: raw feed items, the enrichment payload,
//! and the enriched record that ends up in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feed source descriptor (`{"id": ..., "name": ...}` in NewsAPI payloads).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Source {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One item as received from the feed. Never mutated after fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    /// Feed fields we do not interpret (author, content, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawRecord {
    /// Publication time as UTC; `None` when absent or not RFC 3339.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Unix millis used for ordering; missing/invalid sorts as epoch zero.
    pub fn published_ts(&self) -> i64 {
        self.published().map(|dt| dt.timestamp_millis()).unwrap_or(0)
    }

    pub fn source_name(&self) -> &str {
        self.source.name.as_deref().unwrap_or("unknown")
    }

    /// Non-blank title, if any.
    pub fn title_text(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Non-blank description, if any.
    pub fn description_text(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|t| !t.is_empty())
}

/// Closed set of case categories. Serialized with the labels the frontend reads.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "寿险")]
    Life,
    #[default]
    #[serde(rename = "产险")]
    Property,
    #[serde(rename = "再保险")]
    Reinsurance,
    #[serde(rename = "大健康")]
    Health,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Life,
        Category::Property,
        Category::Reinsurance,
        Category::Health,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Life => "寿险",
            Category::Property => "产险",
            Category::Reinsurance => "再保险",
            Category::Health => "大健康",
        }
    }

    /// Accepts the stored label or its English alias (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let t = s.trim();
        if let Some(c) = Self::ALL.into_iter().find(|c| c.label() == t) {
            return Some(c);
        }
        match t.to_ascii_lowercase().as_str() {
            "life" => Some(Category::Life),
            "property" | "p&c" => Some(Category::Property),
            "reinsurance" => Some(Category::Reinsurance),
            "health" => Some(Category::Health),
            _ => None,
        }
    }
}

/// Title translations; every language slot is always filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Translations {
    pub zh: String,
    pub en: String,
    pub th: String,
    pub vi: String,
}

impl Translations {
    pub const LANGS: [&'static str; 4] = ["zh", "en", "th", "vi"];

    /// Same text in all four slots.
    pub fn replicated(text: &str) -> Self {
        Self {
            zh: text.to_string(),
            en: text.to_string(),
            th: text.to_string(),
            vi: text.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.zh, &self.en, &self.th, &self.vi]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}

/// Fully populated enrichment payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrichment {
    pub category: Category,
    pub summary: String,
    pub translations: Translations,
}

/// A raw record plus its enrichment, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub raw: RawRecord,
    pub category: Category,
    pub summary: String,
    pub translations: Translations,
}

impl EnrichedRecord {
    pub fn new(raw: RawRecord, enrichment: Enrichment) -> Self {
        Self {
            raw,
            category: enrichment.category,
            summary: enrichment.summary,
            translations: enrichment.translations,
        }
    }

    pub fn published_ts(&self) -> i64 {
        self.raw.published_ts()
    }
}
