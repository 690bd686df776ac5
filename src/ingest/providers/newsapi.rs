// src/ingest/providers/newsapi.rs
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::types::FeedProvider;
use crate::model::RawRecord;

pub const NEWSAPI_ENDPOINT: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawRecord>,
}

pub struct NewsApiProvider {
    mode: Mode,
    language: String,
    page_size: usize,
}

enum Mode {
    /// Captured response body; used by tests and offline runs.
    Fixture(String),
    Http {
        api_key: String,
        client: reqwest::Client,
    },
}

impl NewsApiProvider {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
            language: "en".to_string(),
            page_size: 10,
        }
    }

    pub fn from_api_key(api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fraud-feed-enricher/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .context("building newsapi http client")?;
        Ok(Self {
            mode: Mode::Http {
                api_key: api_key.to_string(),
                client,
            },
            language: "en".to_string(),
            page_size: 10,
        })
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn parse_body(&self, body: &str) -> Result<Vec<RawRecord>> {
        let env: Envelope = serde_json::from_str(body).context("parsing newsapi response")?;
        match env.status.as_deref() {
            Some("ok") => {}
            Some("error") => bail!(
                "newsapi error: {}",
                env.message.as_deref().unwrap_or("unknown error")
            ),
            other => bail!("newsapi unexpected status: {other:?}"),
        }
        if env.articles.is_empty() {
            bail!("newsapi returned no articles");
        }
        let mut out = env.articles;
        out.truncate(self.page_size);
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for NewsApiProvider {
    async fn fetch(&self, query: &str) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(body) => self.parse_body(body),
            Mode::Http { api_key, client } => {
                let page_size = self.page_size.to_string();
                let resp = client
                    .get(NEWSAPI_ENDPOINT)
                    .query(&[
                        ("q", query),
                        ("language", self.language.as_str()),
                        ("sortBy", "publishedAt"),
                        ("pageSize", page_size.as_str()),
                        ("apiKey", api_key.as_str()),
                    ])
                    .send()
                    .await
                    // the URL carries the API key
                    .map_err(|e| e.without_url())
                    .context("newsapi http get()")?;

                let status = resp.status();
                let body = resp
                    .text()
                    .await
                    .map_err(|e| e.without_url())
                    .context("newsapi http .text()")?;
                if !status.is_success() {
                    let message = serde_json::from_str::<Envelope>(&body)
                        .ok()
                        .and_then(|e| e.message)
                        .unwrap_or_else(|| status.to_string());
                    return Err(anyhow!("newsapi HTTP {}: {message}", status.as_u16()));
                }
                self.parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
