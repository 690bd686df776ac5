// src/enrich/degrade.rs
//! Defaults used when AI enrichment cannot be obtained for a record.

use crate::model::{Category, Enrichment, RawRecord, Translations};

pub const DEFAULT_CATEGORY: Category = Category::Property;
pub const SUMMARY_PLACEHOLDER: &str = "AI 处理失败，显示原文摘要";
pub const TITLE_PLACEHOLDER: &str = "无标题";
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Summary fallback: the source description, else the placeholder.
pub fn fallback_summary(raw: &RawRecord) -> String {
    raw.description_text()
        .map(|d| cap_chars(d, SUMMARY_MAX_CHARS))
        .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string())
}

/// Translation fallback: the original title in every language slot.
pub fn fallback_translations(raw: &RawRecord) -> Translations {
    Translations::replicated(raw.title_text().unwrap_or(TITLE_PLACEHOLDER))
}

/// Fully populated default enrichment.
pub fn degraded(raw: &RawRecord) -> Enrichment {
    Enrichment {
        category: DEFAULT_CATEGORY,
        summary: fallback_summary(raw),
        translations: fallback_translations(raw),
    }
}

pub(crate) fn cap_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
