// src/ingest/mod.rs
pub mod fallback;
pub mod providers;
pub mod types;

use crate::ingest::types::{FeedOrigin, FeedProvider, FetchOutcome};
use crate::model::{non_blank, RawRecord};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_records_total", "Records returned by the feed provider.");
        describe_counter!(
            "feed_fallback_total",
            "Runs where the provider failed and sample records were used."
        );
        describe_counter!("ingest_new_total", "Fetched records not yet in the store.");
        describe_counter!(
            "ingest_dedup_total",
            "Fetched records dropped as already stored."
        );
    });
}

/// Content fingerprint used as the sole deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

/// SHA-256 over the URL when present, else over the title.
///
/// Records with neither yield `None` and are never treated as duplicates.
pub fn fingerprint(record: &RawRecord) -> Option<Fingerprint> {
    let key = non_blank(record.url.as_deref()).or_else(|| record.title_text())?;
    Some(Fingerprint(format!("{:x}", Sha256::digest(key.as_bytes()))))
}

/// Keep fetched records whose fingerprint is not in `existing`.
///
/// Order-preserving; `existing` is only read. Repeats within `fetched` keep
/// their first occurrence.
pub fn filter_new(fetched: &[RawRecord], existing: &HashSet<Fingerprint>) -> Vec<RawRecord> {
    let mut seen: HashSet<Fingerprint> = HashSet::new();
    let mut out = Vec::with_capacity(fetched.len());
    for rec in fetched {
        match fingerprint(rec) {
            Some(fp) => {
                if existing.contains(&fp) || !seen.insert(fp) {
                    continue;
                }
                out.push(rec.clone());
            }
            None => out.push(rec.clone()),
        }
    }
    out
}

/// Fetch from the provider; any failure or empty result is replaced by the
/// fixed sample set so the run can continue.
pub async fn fetch_or_fallback(provider: &dyn FeedProvider, query: &str) -> FetchOutcome {
    ensure_metrics_described();

    let reason = match provider.fetch(query).await {
        Ok(records) if !records.is_empty() => {
            counter!("feed_records_total").increment(records.len() as u64);
            tracing::info!(
                target: "ingest",
                provider = provider.name(),
                count = records.len(),
                "feed fetched"
            );
            return FetchOutcome {
                records,
                origin: FeedOrigin::Live,
            };
        }
        Ok(_) => "feed returned no records".to_string(),
        Err(e) => format!("{e:#}"),
    };

    tracing::warn!(
        target: "ingest",
        provider = provider.name(),
        reason = %reason,
        "feed unavailable, using sample records"
    );
    counter!("feed_fallback_total").increment(1);
    FetchOutcome {
        records: fallback::sample_records(),
        origin: FeedOrigin::Fallback { reason },
    }
}

/// Split fetched records into new ones, logging how many were already stored.
pub fn select_new(fetched: &[RawRecord], existing: &HashSet<Fingerprint>) -> Vec<RawRecord> {
    ensure_metrics_described();
    let fresh = filter_new(fetched, existing);
    let dropped = fetched.len() - fresh.len();
    counter!("ingest_new_total").increment(fresh.len() as u64);
    counter!("ingest_dedup_total").increment(dropped as u64);
    tracing::info!(
        target: "ingest",
        fetched = fetched.len(),
        new = fresh.len(),
        duplicates = dropped,
        "dedup done"
    );
    fresh
}

/// Clean feed text before embedding it into an AI prompt: decode entities,
/// strip tags, collapse whitespace, cap length. Stored records keep the
/// original text.
pub fn prompt_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // NewsAPI truncation marker, e.g. "[+2817 chars]"
    static RE_TRUNC: OnceCell<regex::Regex> = OnceCell::new();
    let re_trunc = RE_TRUNC.get_or_init(|| regex::Regex::new(r"\[\+\d+ chars\]").unwrap());
    out = re_trunc.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 1000 {
        out = out.chars().take(1000).collect();
    }
    out
}
