// tests/providers_newsapi.rs
use fraud_feed_enricher::ingest::fallback::is_sample;
use fraud_feed_enricher::ingest::providers::newsapi::NewsApiProvider;
use fraud_feed_enricher::ingest::{fetch_or_fallback, types::FeedOrigin};
use fraud_feed_enricher::FeedProvider;

#[tokio::test]
async fn parses_newsapi_fixture() {
    let p = NewsApiProvider::from_fixture(include_str!("fixtures/newsapi_ok.json"));
    let recs = p.fetch("insurance fraud").await.expect("ok");

    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].source.name.as_deref(), Some("Reuters"));
    assert_eq!(recs[0].url_to_image.as_deref(), Some("https://news.example/staged-crash.jpg"));
    assert_eq!(recs[0].extra.get("author").and_then(|v| v.as_str()), Some("Staff"));
    assert!(recs[2].description.is_none());
    assert!(recs.iter().all(|r| r.published_ts() > 0));
}

#[tokio::test]
async fn live_feed_is_not_replaced() {
    let p = NewsApiProvider::from_fixture(include_str!("fixtures/newsapi_ok.json"));
    let out = fetch_or_fallback(&p, "insurance fraud").await;
    assert_eq!(out.origin, FeedOrigin::Live);
    assert!(!out.records.iter().any(is_sample));
}

#[tokio::test]
async fn error_and_empty_payloads_fall_back_to_samples() {
    for body in [
        include_str!("fixtures/newsapi_error.json"),
        include_str!("fixtures/newsapi_empty.json"),
        "<html>502 Bad Gateway</html>",
    ] {
        let p = NewsApiProvider::from_fixture(body);
        let out = fetch_or_fallback(&p, "insurance fraud").await;
        assert!(out.origin.is_fallback(), "body: {body}");
        assert_eq!(out.records.len(), 5);
        assert!(out.records.iter().all(is_sample));
        assert!(out.records.iter().all(|r| r.extra.get("category").is_none()));
    }
}

#[tokio::test]
async fn fallback_reason_carries_provider_message() {
    let p = NewsApiProvider::from_fixture(include_str!("fixtures/newsapi_error.json"));
    match fetch_or_fallback(&p, "q").await.origin {
        FeedOrigin::Fallback { reason } => assert!(reason.contains("too many requests")),
        FeedOrigin::Live => panic!("expected fallback"),
    }
}
