// src/store.rs
//! Persisted collection of enriched records (`data.json`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;

use crate::enrich::parse;
use crate::ingest::{fingerprint, Fingerprint};
use crate::model::{EnrichedRecord, RawRecord};

pub const STORE_VERSION: &str = "4.0";

/// On-disk document. `total` and `lastUpdated` are derived at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    pub version: String,
    pub last_updated: String,
    pub total: usize,
    pub articles: Vec<EnrichedRecord>,
}

impl StoreDocument {
    pub fn from_records(records: Vec<EnrichedRecord>) -> Self {
        Self {
            version: STORE_VERSION.to_string(),
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total: records.len(),
            articles: records,
        }
    }
}

/// Read shape: articles stay untyped so one bad entry cannot sink the rest.
#[derive(Debug, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    articles: Vec<Value>,
}

const ENRICHMENT_KEYS: [&str; 4] = ["category", "summary", "summary_zh", "translations"];

/// Rebuild one stored article. Enrichment fields go through the same
/// validation as fresh AI output, so legacy labels and partial translations
/// are repaired. `None` when the feed part itself is unreadable.
fn restore(article: Value) -> Option<EnrichedRecord> {
    let Value::Object(mut obj) = article else {
        return None;
    };
    let mut enrichment = serde_json::Map::new();
    for key in ENRICHMENT_KEYS {
        if let Some(v) = obj.remove(key) {
            enrichment.insert(key.to_string(), v);
        }
    }
    let raw: RawRecord = serde_json::from_value(Value::Object(obj)).ok()?;
    let e = parse::validate(&Value::Object(enrichment), &raw);
    Some(EnrichedRecord::new(raw, e))
}

#[derive(Debug, Clone, Default)]
pub struct LoadedStore {
    pub records: Vec<EnrichedRecord>,
    pub fingerprints: HashSet<Fingerprint>,
}

impl LoadedStore {
    pub fn from_records(records: Vec<EnrichedRecord>) -> Self {
        let fingerprints = records.iter().filter_map(|r| fingerprint(&r.raw)).collect();
        Self {
            records,
            fingerprints,
        }
    }
}

/// Read the store; a missing or unreadable file yields an empty store.
pub async fn load(path: &Path) -> LoadedStore {
    let content = match fs::read_to_string(path).await {
        Ok(s) => s,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                tracing::info!(target: "store", path = %path.display(), "no store yet, starting empty");
            } else {
                tracing::warn!(target: "store", path = %path.display(), error = %e, "store unreadable, starting empty");
            }
            return LoadedStore::default();
        }
    };

    let doc = match serde_json::from_str::<StoredDocument>(&content) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(target: "store", path = %path.display(), error = %e, "store unparsable, starting empty");
            return LoadedStore::default();
        }
    };

    let stored = doc.articles.len();
    let records: Vec<EnrichedRecord> = doc.articles.into_iter().filter_map(restore).collect();
    if records.len() < stored {
        tracing::warn!(
            target: "store",
            path = %path.display(),
            dropped = stored - records.len(),
            "unreadable articles skipped"
        );
    }
    tracing::info!(
        target: "store",
        path = %path.display(),
        version = doc.version.as_deref().unwrap_or("unknown"),
        records = records.len(),
        "store loaded"
    );
    LoadedStore::from_records(records)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace the store with `records`: write a sibling temp file, then rename
/// it over the target so a crash never leaves a half-written store.
pub async fn write(path: &Path, records: Vec<EnrichedRecord>) -> Result<StoreDocument> {
    let doc = StoreDocument::from_records(records);
    let json = serde_json::to_vec_pretty(&doc).context("serializing store")?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating store dir {}", dir.display()))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, &json)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("replacing {}", path.display()));
    }

    tracing::info!(target: "store", path = %path.display(), total = doc.total, "store written");
    Ok(doc)
}
