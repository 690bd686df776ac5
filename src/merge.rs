// src/merge.rs
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::model::{Category, EnrichedRecord};

pub const RETENTION_CAP: usize = 50;

/// `new ++ existing`, stable-sorted newest first, truncated to the cap.
/// Inputs are expected to be disjoint by fingerprint.
pub fn merge(new_enriched: Vec<EnrichedRecord>, existing: Vec<EnrichedRecord>) -> Vec<EnrichedRecord> {
    merge_with_cap(new_enriched, existing, RETENTION_CAP)
}

pub fn merge_with_cap(
    new_enriched: Vec<EnrichedRecord>,
    existing: Vec<EnrichedRecord>,
    cap: usize,
) -> Vec<EnrichedRecord> {
    let mut all = new_enriched;
    all.extend(existing);
    // sort_by_key is stable: equal timestamps keep input order.
    all.sort_by_key(|r| Reverse(r.published_ts()));
    all.truncate(cap);
    all
}

/// Per-category counts for the run summary.
pub fn category_counts(records: &[EnrichedRecord]) -> BTreeMap<Category, usize> {
    let mut out = BTreeMap::new();
    for r in records {
        *out.entry(r.category).or_insert(0) += 1;
    }
    out
}
