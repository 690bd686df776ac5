//! Fraud feed enricher — binary entrypoint.
//! One run: fetch the news feed, enrich new articles with AI metadata, merge
//! into the bounded store, write it back, exit.

use std::process::ExitCode;
use std::sync::Arc;

use fraud_feed_enricher::config::AppConfig;
use fraud_feed_enricher::enrich::provider::GeminiProvider;
use fraud_feed_enricher::enrich::{EnrichSettings, Enricher};
use fraud_feed_enricher::ingest::providers::newsapi::NewsApiProvider;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; CI provides real env vars.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "configuration invalid, nothing was fetched");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(config = ?cfg, "configuration loaded");

    let settings = EnrichSettings::default();
    let feed = match NewsApiProvider::from_api_key(&cfg.news_api_key, settings.request_timeout) {
        Ok(p) => p.with_language(&cfg.language).with_page_size(cfg.page_size),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "cannot build feed client");
            return ExitCode::FAILURE;
        }
    };
    let ai = match GeminiProvider::new(
        &cfg.gemini_api_key,
        Some(&cfg.gemini_model),
        settings.request_timeout,
    ) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "cannot build AI client");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(model = ai.model(), "AI provider ready");
    let enricher = Enricher::new(Arc::new(ai), settings);

    match fraud_feed_enricher::run(&feed, &cfg.query, &enricher, &cfg.data_path).await {
        Ok(summary) => {
            tracing::info!(
                new = summary.new,
                stored = summary.stored,
                degraded = summary.report.degraded,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "run failed, store not updated");
            ExitCode::FAILURE
        }
    }
}
