// src/ingest/fallback.rs
//! Fixed sample records substituted when the feed is unavailable.
//!
//! Samples carry `source.id == "sample"`, no URL and no enrichment fields, so
//! they are easy to tell apart from live feed data. Their fingerprint falls
//! back to the title, which keeps them stable across runs.

use chrono::{Duration, Utc};

use crate::model::{RawRecord, Source};

pub const SAMPLE_SOURCE_ID: &str = "sample";

const SAMPLES: [(&str, &str, &str); 5] = [
    (
        "Insurance Fraud Ring Busted: $2M Life Insurance Scam Uncovered",
        "Authorities have arrested five individuals in connection with a massive life insurance fraud scheme that defrauded insurers of over $2 million through fake death certificates and identity theft.",
        "Insurance Journal",
    ),
    (
        "Auto Insurance Fraud Investigation Leads to 12 Arrests",
        "A year-long investigation into staged auto accidents has resulted in the arrest of 12 suspects who allegedly orchestrated fake collisions to collect insurance payouts.",
        "Reuters",
    ),
    (
        "Medical Insurance Fraud: Doctor Charged with $5M Billing Scheme",
        "A prominent physician has been charged with defrauding health insurance companies of $5 million through fraudulent billing practices and unnecessary medical procedures.",
        "Healthcare News",
    ),
    (
        "Critical Illness Insurance Fraud: Fake Cancer Diagnosis Exposed",
        "Insurance investigators have uncovered a scheme where individuals faked critical illness diagnoses, particularly cancer, to claim large insurance payouts from critical illness policies.",
        "Insurance Times",
    ),
    (
        "Reinsurance Fraud Case: International Investigation Underway",
        "Regulators from multiple countries are investigating a complex reinsurance fraud scheme that spans across borders, involving fake reinsurance contracts and manipulated claims data.",
        "Financial Times",
    ),
];

/// Five raw records, newest first, one day apart.
pub fn sample_records() -> Vec<RawRecord> {
    let now = Utc::now();
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, (title, description, source))| RawRecord {
            source: Source {
                id: Some(SAMPLE_SOURCE_ID.to_string()),
                name: Some((*source).to_string()),
            },
            title: Some((*title).to_string()),
            description: Some((*description).to_string()),
            url: None,
            url_to_image: None,
            published_at: Some((now - Duration::days(i as i64)).to_rfc3339()),
            extra: Default::default(),
        })
        .collect()
}

pub fn is_sample(record: &RawRecord) -> bool {
    record.source.id.as_deref() == Some(SAMPLE_SOURCE_ID)
}
