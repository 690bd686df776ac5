// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use fraud_feed_enricher::{AiProvider, EnrichError, FeedProvider, RawRecord};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::time::Duration;

pub fn raw(url: &str, title: &str, published_at: &str) -> RawRecord {
    RawRecord {
        source: fraud_feed_enricher::model::Source {
            id: None,
            name: Some("Test Wire".into()),
        },
        title: Some(title.into()),
        description: Some(format!("{title} description")),
        url: Some(url.into()),
        published_at: Some(published_at.into()),
        ..Default::default()
    }
}

/// Well-formed enrichment element for `title`.
pub fn element(title: &str, category: &str) -> Value {
    json!({
        "category": category,
        "summary": format!("摘要 {title}"),
        "translations": {
            "zh": format!("中 {title}"),
            "en": title,
            "th": format!("ไทย {title}"),
            "vi": format!("VI {title}")
        }
    })
}

pub fn is_batch_prompt(prompt: &str) -> bool {
    prompt.contains("JSON 数组")
}

type Handler = dyn Fn(&str) -> Result<String, EnrichError> + Send + Sync;

/// AI provider answering through a closure; every prompt is recorded.
pub struct ScriptedAi {
    handler: Box<Handler>,
    batch_delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedAi {
    pub fn new(handler: impl Fn(&str) -> Result<String, EnrichError> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            batch_delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Batch prompts hang for `delay` before answering.
    pub fn with_slow_batches(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn batch_calls(&self) -> usize {
        self.prompts.lock().iter().filter(|p| is_batch_prompt(p)).count()
    }

    pub fn single_calls_for(&self, title: &str) -> usize {
        self.prompts
            .lock()
            .iter()
            .filter(|p| !is_batch_prompt(p) && p.contains(title))
            .count()
    }
}

#[async_trait]
impl AiProvider for ScriptedAi {
    async fn complete(&self, prompt: &str) -> Result<String, EnrichError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(delay) = self.batch_delay {
            if is_batch_prompt(prompt) {
                tokio::time::sleep(delay).await;
            }
        }
        (self.handler)(prompt)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Answers every prompt with well-formed elements for the titles it contains,
/// in prompt order.
pub fn echo_handler(titles: Vec<String>) -> impl Fn(&str) -> Result<String, EnrichError> + Send + Sync {
    move |prompt: &str| {
        let mut found: Vec<(usize, &String)> = titles
            .iter()
            .filter_map(|t| prompt.find(t.as_str()).map(|pos| (pos, t)))
            .collect();
        found.sort();
        let items: Vec<Value> = found.iter().map(|(_, t)| element(t, "寿险")).collect();
        if is_batch_prompt(prompt) {
            Ok(Value::Array(items).to_string())
        } else {
            items
                .into_iter()
                .next()
                .map(|v| v.to_string())
                .ok_or(EnrichError::Unparsable)
        }
    }
}

pub enum FeedScript {
    Records(Vec<RawRecord>),
    Fail(&'static str),
}

pub struct MockFeed(pub FeedScript);

#[async_trait]
impl FeedProvider for MockFeed {
    async fn fetch(&self, _query: &str) -> Result<Vec<RawRecord>> {
        match &self.0 {
            FeedScript::Records(v) => Ok(v.clone()),
            FeedScript::Fail(msg) => Err(anyhow::anyhow!(*msg)),
        }
    }

    fn name(&self) -> &'static str {
        "mock-feed"
    }
}
