//! AI provider abstraction: one prompt in, raw model text out.
//!
//! Providers do the remote call only. Parsing, validation, retries and
//! degradation live in the enricher so every provider gets the same contract.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that abort one enrichment call (batch or single item).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrichError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("response has no content envelope")]
    MissingContent,
    #[error("response text is not parsable JSON")]
    Unparsable,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, EnrichError>;
    fn name(&self) -> &'static str;
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent` provider.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fraud-feed-enricher/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.unwrap_or(DEFAULT_GEMINI_MODEL).to_string(),
            base_url: GEMINI_BASE.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}
#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct Req<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}
#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}

fn transport_error(e: reqwest::Error) -> EnrichError {
    if e.is_timeout() {
        EnrichError::Timeout
    } else {
        // the URL carries the API key
        EnrichError::Transport(e.without_url().to_string())
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a Gemini response body.
pub fn gemini_text(body: &str) -> Result<String, EnrichError> {
    let resp: Resp = serde_json::from_str(body).map_err(|_| EnrichError::MissingContent)?;
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(EnrichError::MissingContent)
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, EnrichError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(EnrichError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await.map_err(transport_error)?;
        gemini_text(&body)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_text_reads_first_part() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[1]"}],"role":"model"}}]}"#;
        assert_eq!(gemini_text(body).unwrap(), "[1]");
    }

    #[test]
    fn gemini_without_candidates_is_missing_content() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(gemini_text(body), Err(EnrichError::MissingContent));
    }
}
