//! Breakdown composer: resolved tables → chart series

use crate::services::metrics::ResolvedMetric;
use crate::types::{Bucket, Series, SliceEntry};

/// Composes output series from a resolved metric
pub struct BreakdownComposer<'a> {
    palette: &'a [String],
}

impl<'a> BreakdownComposer<'a> {
    /// `palette[0]` colors the aggregate series; groups cycle from index 1
    pub fn new(palette: &'a [String]) -> Self {
        Self { palette }
    }

    fn color(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return "#000".to_string();
        }
        self.palette[index % self.palette.len()].clone()
    }

    /// One aggregate series labeled `all_label`, then one series per group in
    /// first-seen order. Every series has one value per bucket.
    pub fn compose(
        &self,
        buckets: &[Bucket],
        resolved: &ResolvedMetric,
        all_label: &str,
    ) -> Vec<Series> {
        let mut series = Vec::with_capacity(resolved.group_counts.len() + 1);

        series.push(Series {
            label: all_label.to_string(),
            color: self.color(0),
            values: buckets
                .iter()
                .map(|b| resolved.bucket_counts.get(&b.key))
                .collect(),
        });

        for (i, (group, table)) in resolved.group_counts.iter().enumerate() {
            series.push(Series {
                label: group.to_string(),
                color: self.color(i + 1),
                values: buckets.iter().map(|b| table.get(&b.key)).collect(),
            });
        }

        series
    }

    /// Non-zero group counts at a single bucket, in first-seen order.
    ///
    /// Colors are assigned to the surviving entries only, starting at
    /// palette index 1.
    pub fn slice(&self, resolved: &ResolvedMetric, bucket_key: &str) -> Vec<SliceEntry> {
        resolved
            .group_counts
            .iter()
            .map(|(group, table)| (group, table.get(bucket_key)))
            .filter(|(_, count)| *count > 0)
            .enumerate()
            .map(|(i, (group, count))| SliceEntry {
                label: group.to_string(),
                count,
                color: self.color(i + 1),
            })
            .collect()
    }
}
