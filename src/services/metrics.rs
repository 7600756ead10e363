//! Metric resolution
//!
//! A metric id is looked up in a [`MetricCatalog`] and turned into a pair of
//! tables (per bucket, per dimension group). Adding a metric means adding a
//! catalog entry, not a new branch.

use indexmap::IndexMap;
use serde::Serialize;

use crate::services::aggregator::AggregatedCounts;
use crate::services::config::DashboardConfig;
use crate::types::{CountTable, Dataset, GroupedCounts};

/// Arithmetic over status slices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// Sum of the listed statuses
    SumOf(Vec<String>),
    /// Total minus the listed statuses
    TotalMinus(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    /// Every record
    All,
    /// Records with exactly this status
    Direct(String),
    Derived(Formula),
    /// Not in the catalog; resolves to empty tables
    Unknown,
}

/// Tables a metric resolves to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedMetric {
    pub bucket_counts: CountTable,
    pub group_counts: GroupedCounts,
}

impl ResolvedMetric {
    /// Nothing to plot
    pub fn is_empty(&self) -> bool {
        self.bucket_counts.is_empty() && self.group_counts.is_empty()
    }
}

/// Closed vocabulary of metric ids
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    entries: IndexMap<String, Metric>,
}

impl MetricCatalog {
    /// Build the catalog: `all`/`all_cases`, `accepted`, `rejected`, and one
    /// direct metric per configured status.
    pub fn new(config: &DashboardConfig) -> Self {
        let mut rejected: Vec<String> = Vec::new();
        for status in &config.rejected_statuses {
            if !rejected.contains(status) {
                rejected.push(status.clone());
            }
        }

        let mut entries = IndexMap::new();
        entries.insert("all".to_string(), Metric::All);
        entries.insert("all_cases".to_string(), Metric::All);
        entries.insert(
            "accepted".to_string(),
            Metric::Derived(Formula::TotalMinus(rejected.clone())),
        );
        entries.insert(
            "rejected".to_string(),
            Metric::Derived(Formula::SumOf(rejected)),
        );
        for status in &config.statuses {
            entries
                .entry(status.clone())
                .or_insert_with(|| Metric::Direct(status.clone()));
        }

        Self { entries }
    }

    pub fn lookup(&self, id: &str) -> Metric {
        self.entries.get(id).cloned().unwrap_or(Metric::Unknown)
    }

    /// Known metric ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether the single-bucket breakdown makes sense for this metric.
    ///
    /// Defendants always allow it. Cases allow it for any catalog metric:
    /// the aggregate, a plain status, or a derived status set.
    pub fn supports_slice(&self, id: &str, dataset: Dataset) -> bool {
        if !dataset.has_status() {
            return true;
        }
        !matches!(self.lookup(id), Metric::Unknown)
    }

    /// Resolve `id` against `counts`.
    ///
    /// Datasets without a status collapse every id to the aggregate.
    /// Unknown ids yield empty tables.
    pub fn resolve(&self, id: &str, counts: &AggregatedCounts, dataset: Dataset) -> ResolvedMetric {
        if !dataset.has_status() {
            return Self::all(counts);
        }

        match self.lookup(id) {
            Metric::All => Self::all(counts),
            Metric::Direct(status) => ResolvedMetric {
                bucket_counts: counts.by_status.group(&status).cloned().unwrap_or_default(),
                group_counts: counts
                    .by_status_and_dimension
                    .status(&status)
                    .cloned()
                    .unwrap_or_default(),
            },
            Metric::Derived(Formula::SumOf(statuses)) => Self::sum_of(counts, &statuses),
            Metric::Derived(Formula::TotalMinus(statuses)) => Self::total_minus(counts, &statuses),
            Metric::Unknown => {
                tracing::debug!(metric = id, "unknown metric, nothing to plot");
                ResolvedMetric::default()
            }
        }
    }

    fn all(counts: &AggregatedCounts) -> ResolvedMetric {
        ResolvedMetric {
            bucket_counts: counts.total.clone(),
            group_counts: counts.by_dimension.clone(),
        }
    }

    fn sum_of(counts: &AggregatedCounts, statuses: &[String]) -> ResolvedMetric {
        let mut resolved = ResolvedMetric::default();
        for status in statuses {
            if let Some(table) = counts.by_status.group(status) {
                for (key, n) in table.iter() {
                    resolved.bucket_counts.add(key, n);
                }
            }
            if let Some(grouped) = counts.by_status_and_dimension.status(status) {
                for (group, table) in grouped.iter() {
                    let target = resolved.group_counts.entry(group);
                    for (key, n) in table.iter() {
                        target.add(key, n);
                    }
                }
            }
        }
        resolved
    }

    fn total_minus(counts: &AggregatedCounts, statuses: &[String]) -> ResolvedMetric {
        let mut resolved = ResolvedMetric::default();

        for (key, total) in counts.total.iter() {
            let removed = statuses
                .iter()
                .fold(0u64, |acc, s| acc.saturating_add(counts.by_status.get(s, key)));
            resolved.bucket_counts.set(key, total.saturating_sub(removed));
        }

        for (group, table) in counts.by_dimension.iter() {
            let target = resolved.group_counts.entry(group);
            for (key, n) in table.iter() {
                let removed = statuses.iter().fold(0u64, |acc, s| {
                    acc.saturating_add(counts.by_status_and_dimension.get(s, group, key))
                });
                target.set(key, n.saturating_sub(removed));
            }
        }

        resolved
    }
}
