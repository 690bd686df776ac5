// src/enrich/parse.rs
//! Tolerant extraction of the JSON payload from model text, and per-field
//! validation of each emitted element.

use serde_json::Value;

use crate::enrich::degrade::{cap_chars, fallback_summary, fallback_translations, SUMMARY_MAX_CHARS};
use crate::enrich::provider::EnrichError;
use crate::model::{Category, Enrichment, RawRecord, Translations};

/// Parse model text as JSON: whole text first, then the first balanced
/// `[...]` or `{...}` region. Fenced output is covered by the second step.
pub fn extract_json(text: &str) -> Result<Value, EnrichError> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Ok(v);
    }
    let region = first_balanced(trimmed).ok_or(EnrichError::Unparsable)?;
    serde_json::from_str(region).map_err(|_| EnrichError::Unparsable)
}

/// First region opened by `[` or `{` and closed by its matching bracket.
/// Brackets inside JSON strings are ignored.
fn first_balanced(s: &str) -> Option<&str> {
    let start = s.find(['[', '{'])?;
    let mut stack: Vec<char> = Vec::new();
    let mut in_str = false;
    let mut escaped = false;

    for (off, ch) in s[start..].char_indices() {
        if in_str {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_str = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(ch) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&s[start..start + off + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Batch payload as positional slots. A bare object counts as a one-element
/// array; anything else is unparsable.
pub fn positional(value: Value) -> Result<Vec<Value>, EnrichError> {
    match value {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => Err(EnrichError::Unparsable),
    }
}

/// Single-item payload: an object, or an array whose first element is one.
pub fn single(value: Value) -> Result<Value, EnrichError> {
    match value {
        obj @ Value::Object(_) => Ok(obj),
        Value::Array(items) => items
            .into_iter()
            .next()
            .filter(Value::is_object)
            .ok_or(EnrichError::Unparsable),
        _ => Err(EnrichError::Unparsable),
    }
}

/// Validate one emitted element against its source record. Every field that
/// is missing or invalid is replaced individually.
pub fn validate(value: &Value, raw: &RawRecord) -> Enrichment {
    let category = value
        .get("category")
        .and_then(Value::as_str)
        .and_then(Category::parse)
        .unwrap_or_default();

    let summary = value
        .get("summary")
        .or_else(|| value.get("summary_zh"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| cap_chars(s, SUMMARY_MAX_CHARS))
        .unwrap_or_else(|| fallback_summary(raw));

    let translations = value
        .get("translations")
        .and_then(|t| serde_json::from_value::<Translations>(t.clone()).ok())
        .map(|t| Translations {
            zh: t.zh.trim().to_string(),
            en: t.en.trim().to_string(),
            th: t.th.trim().to_string(),
            vi: t.vi.trim().to_string(),
        })
        .filter(Translations::is_complete)
        .unwrap_or_else(|| fallback_translations(raw));

    Enrichment {
        category,
        summary,
        translations,
    }
}
