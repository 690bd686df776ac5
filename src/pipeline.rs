// src/pipeline.rs
//! One incremental run: load → fetch → dedup → enrich → merge → write.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use metrics::gauge;

use crate::enrich::{EnrichReport, Enricher};
use crate::ingest::{self, types::FeedOrigin, types::FeedProvider};
use crate::merge;
use crate::model::Category;
use crate::store;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub origin: FeedOrigin,
    pub fetched: usize,
    pub new: usize,
    pub stored: usize,
    pub report: EnrichReport,
    pub categories: BTreeMap<Category, usize>,
}

/// Execute one run against the store at `store_path`.
///
/// Feed, enrichment and store-read problems only degrade data; the only
/// error returned is a failed store write.
pub async fn run(
    feed: &dyn FeedProvider,
    query: &str,
    enricher: &Enricher,
    store_path: &Path,
) -> Result<RunSummary> {
    let existing = store::load(store_path).await;
    tracing::info!(
        target: "pipeline",
        existing = existing.records.len(),
        "starting run"
    );

    let fetched = ingest::fetch_or_fallback(feed, query).await;
    let fresh = ingest::select_new(&fetched.records, &existing.fingerprints);

    let (enriched, report) = if fresh.is_empty() {
        tracing::info!(target: "pipeline", "no new records, store content unchanged");
        (Vec::new(), EnrichReport::default())
    } else {
        enricher.enrich_all(fresh).await
    };

    let new_count = enriched.len();
    let merged = merge::merge(enriched, existing.records);
    let categories = merge::category_counts(&merged);

    let doc = store::write(store_path, merged).await?;
    gauge!("store_records_written").set(doc.total as f64);

    for (category, count) in &categories {
        tracing::info!(target: "pipeline", category = category.label(), count, "category");
    }
    tracing::info!(
        target: "pipeline",
        fetched = fetched.records.len(),
        new = new_count,
        stored = doc.total,
        fallback = fetched.origin.is_fallback(),
        "run complete"
    );

    Ok(RunSummary {
        origin: fetched.origin,
        fetched: fetched.records.len(),
        new: new_count,
        stored: doc.total,
        report,
        categories,
    })
}
