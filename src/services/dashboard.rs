//! Dashboard view builder
//!
//! Runs the whole pipeline for one request: buckets, count tables, metric
//! resolution and series composition. Each call works on the record
//! snapshot it is handed and returns an independent, serializable view.

use serde::{Deserialize, Serialize};

use crate::services::{Aggregator, BreakdownComposer, BucketGenerator, DashboardConfig, MetricCatalog};
use crate::types::{Bucket, Dataset, Granularity, Record, Result, Series, SliceEntry};

/// What to plot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRequest {
    pub dataset: Dataset,
    pub granularity: Granularity,
    /// Field to split the series by
    pub dimension: String,
    /// Metric id; ignored for datasets without status
    pub metric: String,
    /// Bucket key for the breakdown slice; defaults to the latest bucket
    #[serde(default)]
    pub slice_bucket: Option<String>,
}

/// Single-bucket categorical breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceView {
    pub bucket_key: String,
    pub bucket_label: String,
    pub entries: Vec<SliceEntry>,
}

/// Everything the rendering layer needs for one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub title: String,
    /// "cases" or "defendants"
    pub unit: String,
    /// X-axis labels, parallel to `buckets`
    pub labels: Vec<String>,
    pub buckets: Vec<Bucket>,
    pub series: Vec<Series>,
    pub slice: Option<SliceView>,
    /// Records left out for lacking a usable date
    pub excluded: usize,
}

/// Builds dashboard views from record snapshots
pub struct Dashboard {
    config: DashboardConfig,
    catalog: MetricCatalog,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let catalog = MetricCatalog::new(&config);
        Self { config, catalog }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Build the view for `request` over `records`.
    ///
    /// Fails only when a trailing-12 view has no dated record to anchor on.
    pub fn build(&self, records: &[Record], request: &ViewRequest) -> Result<DashboardView> {
        let dataset = request.dataset;
        let buckets = BucketGenerator::generate(records, request.granularity)?;
        let counts = Aggregator::aggregate(records, request.granularity, &request.dimension);

        if counts.excluded > 0 {
            tracing::warn!(
                excluded = counts.excluded,
                total = records.len(),
                "records without a usable date were left out of every bucket"
            );
        }

        let metric = if dataset.has_status() {
            request.metric.as_str()
        } else {
            "all"
        };
        let resolved = self.catalog.resolve(metric, &counts, dataset);
        if resolved.is_empty() {
            tracing::debug!(metric, "metric resolved to empty tables");
        }

        let composer = BreakdownComposer::new(&self.config.palette);
        let series = composer.compose(&buckets, &resolved, dataset.all_label());

        let slice = if self.catalog.supports_slice(metric, dataset) {
            let wanted = request
                .slice_bucket
                .as_deref()
                .or_else(|| buckets.last().map(|b| b.key.as_str()));
            match wanted.and_then(|key| buckets.iter().find(|b| b.key == key)) {
                Some(bucket) => Some(SliceView {
                    bucket_key: bucket.key.clone(),
                    bucket_label: bucket.label.clone(),
                    entries: composer.slice(&resolved, &bucket.key),
                }),
                None => {
                    if let Some(key) = request.slice_bucket.as_deref() {
                        tracing::warn!(bucket = key, "slice bucket not in view");
                    }
                    None
                }
            }
        } else {
            None
        };

        let title = if dataset.has_status() {
            self.config.metric_label(metric)
        } else {
            dataset.all_label().to_string()
        };

        tracing::debug!(
            buckets = buckets.len(),
            series = series.len(),
            granularity = %request.granularity,
            dimension = %request.dimension,
            "built dashboard view"
        );

        Ok(DashboardView {
            title,
            unit: dataset.unit().to_string(),
            labels: buckets.iter().map(|b| b.label.clone()).collect(),
            buckets,
            series,
            slice,
            excluded: counts.excluded,
        })
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}
