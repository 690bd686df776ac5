// src/config/pipeline.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::enrich::provider::DEFAULT_GEMINI_MODEL;

pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_DATA_PATH: &str = "DATA_PATH";

pub const DEFAULT_QUERY: &str = "insurance fraud";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_DATA_PATH: &str = "data.json";

/// Optional overrides from `config/pipeline.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub query: Option<String>,
    pub language: Option<String>,
    pub page_size: Option<usize>,
    pub data_path: Option<PathBuf>,
    pub gemini_model: Option<String>,
}

/// Resolved run configuration. Credentials are never logged.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub news_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub query: String,
    pub language: String,
    pub page_size: usize,
    pub data_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("news_api_key_len", &self.news_api_key.len())
            .field("gemini_api_key_len", &self.gemini_api_key.len())
            .field("gemini_model", &self.gemini_model)
            .field("query", &self.query)
            .field("language", &self.language)
            .field("page_size", &self.page_size)
            .field("data_path", &self.data_path)
            .finish()
    }
}

/// Load overrides from an explicit path.
pub fn load_settings_from(path: &Path) -> Result<FileSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load overrides using env var + fallback:
/// 1) $PIPELINE_CONFIG_PATH (must exist)
/// 2) config/pipeline.toml (optional)
pub fn load_settings_default() -> Result<FileSettings> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        return load_settings_from(&pb);
    }
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default.exists() {
        return load_settings_from(&default);
    }
    Ok(FileSettings::default())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("{key} is not set"),
    }
}

impl AppConfig {
    /// Resolve from the process environment and the optional config file.
    /// Credentials are checked before the config file is touched.
    pub fn from_env() -> Result<Self> {
        let lookup = |k: &str| std::env::var(k).ok();
        required(&lookup, ENV_NEWS_API_KEY)?;
        required(&lookup, ENV_GEMINI_API_KEY)?;
        let file = load_settings_default()?;
        Self::resolve(lookup, file)
    }

    /// Environment values win over file values; both credentials must be
    /// present and non-empty.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>, file: FileSettings) -> Result<Self> {
        let news_api_key = required(&lookup, ENV_NEWS_API_KEY)?;
        let gemini_api_key = required(&lookup, ENV_GEMINI_API_KEY)?;

        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let gemini_model = non_empty(ENV_GEMINI_MODEL)
            .or(file.gemini_model)
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let data_path = non_empty(ENV_DATA_PATH)
            .map(PathBuf::from)
            .or(file.data_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let page_size = file.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            bail!("page_size must be at least 1");
        }

        Ok(Self {
            news_api_key,
            gemini_api_key,
            gemini_model,
            query: file.query.unwrap_or_else(|| DEFAULT_QUERY.to_string()),
            language: file.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            page_size,
            data_path,
        })
    }
}
