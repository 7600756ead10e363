//! Case processing times
//!
//! Mean and median day counts per time bucket, for the two intervals a case
//! sheet records. Only positive day counts are sampled; a bucket with no
//! sample reports `None` rather than zero.

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::services::buckets::{key_of, BucketGenerator};
use crate::types::{Bucket, Granularity, Record, Result, DAYS_FILE_TO_SENT, DAYS_TO_FILE};

/// Which span of a case's life is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    /// Receipt to the charge-filing request
    ToFile,
    /// Filed charges to sentencing
    FileToSentence,
}

impl Interval {
    /// Record measure holding the day count
    pub fn measure(&self) -> &'static str {
        match self {
            Self::ToFile => DAYS_TO_FILE,
            Self::FileToSentence => DAYS_FILE_TO_SENT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ToFile => "Days to File Charges",
            Self::FileToSentence => "Days from Filing to Sentencing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingView {
    pub interval: Interval,
    pub title: String,
    pub labels: Vec<String>,
    pub buckets: Vec<Bucket>,
    /// Mean days per bucket, aligned to `buckets`
    pub mean: Vec<Option<f64>>,
    /// Median days per bucket, aligned to `buckets`
    pub median: Vec<Option<f64>>,
    /// Sample count per bucket
    pub samples: Vec<usize>,
}

impl ProcessingView {
    pub fn latest_mean(&self) -> Option<f64> {
        self.mean.last().copied().flatten()
    }

    pub fn latest_median(&self) -> Option<f64> {
        self.median.last().copied().flatten()
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value, or the average of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Processing-time statistics service
pub struct ProcessingStats;

impl ProcessingStats {
    /// Sample `interval` for every dated record and summarize per bucket.
    ///
    /// Buckets come from [`BucketGenerator`] over the same records, so the
    /// x-axis matches the count views for the same granularity.
    pub fn compute(
        records: &[Record],
        granularity: Granularity,
        interval: Interval,
    ) -> Result<ProcessingView> {
        let buckets = BucketGenerator::generate(records, granularity)?;

        let mut samples: HashMap<String, Vec<f64>> = HashMap::new();
        let mut skipped = 0usize;
        for record in records {
            let (Some(year), Some(month)) = (record.year(), record.month()) else {
                continue;
            };
            match record.measure(interval.measure()) {
                Some(days) if days > 0.0 => samples
                    .entry(key_of(year, month, granularity))
                    .or_default()
                    .push(days),
                _ => skipped += 1,
            }
        }
        tracing::debug!(
            interval = ?interval,
            skipped,
            "records without a positive day count left out"
        );

        let empty = Vec::new();
        let per_bucket: Vec<&Vec<f64>> = buckets
            .iter()
            .map(|b| samples.get(&b.key).unwrap_or(&empty))
            .collect();

        Ok(ProcessingView {
            interval,
            title: interval.label().to_string(),
            labels: buckets.iter().map(|b| b.label.clone()).collect(),
            mean: per_bucket.iter().map(|v| mean(v)).collect(),
            median: per_bucket.iter().map(|v| median(v)).collect(),
            samples: per_bucket.iter().map(|v| v.len()).collect(),
            buckets,
        })
    }
}
