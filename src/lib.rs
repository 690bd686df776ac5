// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod enrich;
pub mod ingest;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::enrich::provider::{AiProvider, EnrichError};
pub use crate::enrich::{EnrichSettings, Enricher};
pub use crate::ingest::types::FeedProvider;
pub use crate::model::{Category, EnrichedRecord, Enrichment, RawRecord, Translations};
pub use crate::pipeline::{run, RunSummary};
