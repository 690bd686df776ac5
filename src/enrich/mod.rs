// src/enrich/mod.rs
//! Enrichment chain: batch call → per-item retries → degraded defaults.
//!
//! Batches run strictly one after another with a short pause between them.
//! When a batch call fails, its records are retried individually and
//! concurrently; results are put back by position, so ordering never depends
//! on arrival order.

pub mod degrade;
pub mod parse;
pub mod prompt;
pub mod provider;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::model::{EnrichedRecord, Enrichment, RawRecord};
use provider::{AiProvider, EnrichError};

pub const BATCH_SIZE: usize = 3;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const BATCH_DELAY: Duration = Duration::from_millis(500);
pub const SINGLE_RETRIES: u32 = 2;
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("enrich_batches_total", "Batch enrichment calls made.");
        describe_counter!(
            "enrich_batch_failures_total",
            "Batch calls that failed and fell back to single-item enrichment."
        );
        describe_counter!(
            "enrich_single_attempts_total",
            "Single-item enrichment attempts (including retries)."
        );
        describe_counter!(
            "enrich_degraded_total",
            "Records stored with default enrichment."
        );
    });
}

#[derive(Debug, Clone)]
pub struct EnrichSettings {
    pub batch_size: usize,
    pub request_timeout: Duration,
    pub batch_delay: Duration,
    /// Attempts after the first one on the single-item path.
    pub single_retries: u32,
    /// Delay before retry `n` is `retry_base_delay * n`.
    pub retry_base_delay: Duration,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            request_timeout: REQUEST_TIMEOUT,
            batch_delay: BATCH_DELAY,
            single_retries: SINGLE_RETRIES,
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }
}

impl EnrichSettings {
    /// Same limits without any sleeping; for tests and dry runs.
    pub fn without_delays() -> Self {
        Self {
            batch_delay: Duration::ZERO,
            retry_base_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// How each record got its enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichPath {
    Batch,
    Single,
    Degraded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub batches: usize,
    pub failed_batches: usize,
    pub via_batch: usize,
    pub via_single: usize,
    pub degraded: usize,
}

impl EnrichReport {
    fn record(&mut self, path: EnrichPath) {
        match path {
            EnrichPath::Batch => self.via_batch += 1,
            EnrichPath::Single => self.via_single += 1,
            EnrichPath::Degraded => self.degraded += 1,
        }
    }
}

pub struct Enricher {
    provider: Arc<dyn AiProvider>,
    settings: EnrichSettings,
}

impl Enricher {
    pub fn new(provider: Arc<dyn AiProvider>, settings: EnrichSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &EnrichSettings {
        &self.settings
    }

    /// Enrich every record, in order. Never fails: records that cannot be
    /// enriched get degraded defaults.
    pub async fn enrich_all(&self, records: Vec<RawRecord>) -> (Vec<EnrichedRecord>, EnrichReport) {
        ensure_metrics_described();
        let mut report = EnrichReport::default();
        let mut out = Vec::with_capacity(records.len());
        let size = self.settings.batch_size.max(1);
        let total = records.len().div_ceil(size);

        for (i, batch) in records.chunks(size).enumerate() {
            if i > 0 && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
            tracing::info!(
                target: "enrich",
                batch = i + 1,
                of = total,
                size = batch.len(),
                "enriching batch"
            );
            let (enrichments, failed) = self.enrich_batch_traced(batch).await;
            report.batches += 1;
            if failed {
                report.failed_batches += 1;
            }
            for (raw, (enrichment, path)) in batch.iter().zip(enrichments) {
                report.record(path);
                out.push(EnrichedRecord::new(raw.clone(), enrichment));
            }
        }

        tracing::info!(
            target: "enrich",
            batches = report.batches,
            failed_batches = report.failed_batches,
            via_batch = report.via_batch,
            via_single = report.via_single,
            degraded = report.degraded,
            "enrichment finished"
        );
        (out, report)
    }

    /// One batch: a single provider call with positional alignment.
    ///
    /// Returns an error only when the whole call failed (transport, timeout,
    /// status, missing envelope, unparsable text). A short or partially
    /// invalid array degrades just the affected positions.
    pub async fn enrich_batch(
        &self,
        batch: &[RawRecord],
    ) -> Result<Vec<(Enrichment, EnrichPath)>, EnrichError> {
        ensure_metrics_described();
        counter!("enrich_batches_total").increment(1);
        let text = self.call(&prompt::batch_prompt(batch)).await?;
        let slots = parse::positional(parse::extract_json(&text)?)?;

        if slots.len() != batch.len() {
            tracing::warn!(
                target: "enrich",
                expected = batch.len(),
                got = slots.len(),
                "batch result length mismatch, aligning by position"
            );
        }

        Ok(batch
            .iter()
            .enumerate()
            .map(|(i, raw)| match slots.get(i).filter(|v| v.is_object()) {
                Some(v) => (parse::validate(v, raw), EnrichPath::Batch),
                None => {
                    counter!("enrich_degraded_total").increment(1);
                    (degrade::degraded(raw), EnrichPath::Degraded)
                }
            })
            .collect())
    }

    async fn enrich_batch_traced(&self, batch: &[RawRecord]) -> (Vec<(Enrichment, EnrichPath)>, bool) {
        match self.enrich_batch(batch).await {
            Ok(v) => (v, false),
            Err(e) => {
                counter!("enrich_batch_failures_total").increment(1);
                tracing::warn!(
                    target: "enrich",
                    error = %e,
                    size = batch.len(),
                    "batch failed, falling back to single-item enrichment"
                );
                // join_all keeps input order regardless of completion order.
                let results = join_all(batch.iter().map(|raw| self.enrich_one(raw))).await;
                (results, true)
            }
        }
    }

    /// One record with bounded retries; exhaustion yields degraded defaults.
    pub async fn enrich_one(&self, raw: &RawRecord) -> (Enrichment, EnrichPath) {
        ensure_metrics_described();
        let max_attempts = 1 + self.settings.single_retries;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            counter!("enrich_single_attempts_total").increment(1);
            match self.try_single(raw).await {
                Ok(enrichment) => return (enrichment, EnrichPath::Single),
                Err(e) => {
                    tracing::warn!(
                        target: "enrich",
                        error = %e,
                        attempt,
                        max_attempts,
                        title = raw.title_text().unwrap_or_default(),
                        "single-item enrichment failed"
                    );
                    if attempt >= max_attempts {
                        break;
                    }
                    let delay = self.settings.retry_base_delay * attempt;
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
        counter!("enrich_degraded_total").increment(1);
        (degrade::degraded(raw), EnrichPath::Degraded)
    }

    async fn try_single(&self, raw: &RawRecord) -> Result<Enrichment, EnrichError> {
        let text = self.call(&prompt::single_prompt(raw)).await?;
        let value = parse::single(parse::extract_json(&text)?)?;
        Ok(parse::validate(&value, raw))
    }

    async fn call(&self, prompt: &str) -> Result<String, EnrichError> {
        match tokio::time::timeout(self.settings.request_timeout, self.provider.complete(prompt)).await {
            Ok(res) => res,
            Err(_) => Err(EnrichError::Timeout),
        }
    }
}
