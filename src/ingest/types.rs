// src/ingest/types.rs
use anyhow::Result;

use crate::model::RawRecord;

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// Fetch the latest records for `query`, most recent first (provider order).
    async fn fetch(&self, query: &str) -> Result<Vec<RawRecord>>;
    fn name(&self) -> &'static str;
}

/// Where the records of a run came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOrigin {
    Live,
    /// Provider failed; fixed sample records were substituted.
    Fallback { reason: String },
}

impl FeedOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, FeedOrigin::Fallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub records: Vec<RawRecord>,
    pub origin: FeedOrigin,
}
