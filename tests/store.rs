// tests/store.rs
mod common;

use common::raw;
use fraud_feed_enricher::enrich::degrade::degraded;
use fraud_feed_enricher::ingest::fingerprint;
use fraud_feed_enricher::store::{self, STORE_VERSION};
use fraud_feed_enricher::{Category, EnrichedRecord, Translations};
use std::fs;

fn rec(url: &str) -> EnrichedRecord {
    let r = raw(url, url, "2024-05-01T10:00:00Z");
    let e = degraded(&r);
    EnrichedRecord::new(r, e)
}

#[tokio::test]
async fn missing_store_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = store::load(&dir.path().join("data.json")).await;
    assert!(loaded.records.is_empty());
    assert!(loaded.fingerprints.is_empty());
}

#[tokio::test]
async fn corrupt_store_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::write(&path, "{ not json").unwrap();
    let loaded = store::load(&path).await;
    assert!(loaded.records.is_empty());
}

#[tokio::test]
async fn legacy_articles_are_repaired_one_by_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let legacy = r#"{
        "version": "3.0",
        "lastUpdated": "2024-04-01T00:00:00.000Z",
        "total": 4,
        "articles": [
            {"source": {"id": null, "name": "Reuters"}, "title": "Good one", "url": "https://x/good",
             "publishedAt": "2024-05-01T10:00:00Z", "category": "寿险", "summary": "正常摘要",
             "translations": {"zh": "好", "en": "Good one", "th": "ดี", "vi": "Tốt"}},
            {"title": "Clinic billing scheme", "url": "https://x/legacy",
             "publishedAt": "2024-04-20T10:00:00Z", "category": "健康险", "summary_zh": "旧摘要",
             "translations": {"zh": "诊所", "en": "Clinic billing scheme"}},
            {"title": "Both keys", "url": "https://x/both", "category": "大健康",
             "summary": "新摘要", "summary_zh": "旧摘要",
             "translations": {"zh": "a", "en": "b", "th": "c", "vi": "d"}},
            "not an article"
        ]
    }"#;
    fs::write(&path, legacy).unwrap();

    let loaded = store::load(&path).await;
    assert_eq!(loaded.records.len(), 3);
    assert_eq!(loaded.fingerprints.len(), 3);

    let good = &loaded.records[0];
    assert_eq!(good.category, Category::Life);
    assert_eq!(good.translations.th, "ดี");

    let repaired = &loaded.records[1];
    assert_eq!(repaired.category, Category::Property);
    assert_eq!(repaired.summary, "旧摘要");
    assert_eq!(repaired.translations, Translations::replicated("Clinic billing scheme"));

    let both = &loaded.records[2];
    assert_eq!(both.category, Category::Health);
    assert_eq!(both.summary, "新摘要");
    assert!(loaded.fingerprints.contains(&fingerprint(&both.raw).unwrap()));
}

#[tokio::test]
async fn write_then_load_roundtrips_with_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data.json");
    let records = vec![rec("https://x/1"), rec("https://x/2")];

    let doc = store::write(&path, records.clone()).await.expect("write ok");
    assert_eq!(doc.total, 2);
    assert_eq!(doc.version, STORE_VERSION);

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v["total"], 2);
    assert_eq!(v["version"], STORE_VERSION);
    assert!(v["lastUpdated"].as_str().is_some());
    assert_eq!(v["articles"][0]["url"], "https://x/1");
    assert!(v["articles"][0]["translations"]["vi"].is_string());

    let loaded = store::load(&path).await;
    assert_eq!(loaded.records, records);
    assert!(loaded
        .fingerprints
        .contains(&fingerprint(&records[1].raw).unwrap()));

    // no temp file left behind
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn write_failure_is_an_error_and_keeps_previous_store() {
    let dir = tempfile::tempdir().unwrap();
    // target path is a directory: rename over it must fail
    let path = dir.path().join("data.json");
    fs::create_dir(&path).unwrap();
    assert!(store::write(&path, vec![rec("https://x/1")]).await.is_err());
    assert!(path.is_dir());
}
