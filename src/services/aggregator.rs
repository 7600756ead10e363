//! Aggregator service for building per-bucket count tables

use serde::Serialize;

use crate::services::buckets::key_of;
use crate::types::{CountTable, Granularity, GroupedCounts, Record, StatusGroupedCounts};

/// Count tables for one (records, granularity, dimension) request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedCounts {
    pub granularity: Granularity,
    /// Field the grouped tables are split by
    pub dimension: String,
    /// bucket key → count
    pub total: CountTable,
    /// status → bucket key → count
    pub by_status: GroupedCounts,
    /// dimension value → bucket key → count
    pub by_dimension: GroupedCounts,
    /// status → dimension value → bucket key → count
    pub by_status_and_dimension: StatusGroupedCounts,
    /// Records with no usable date, counted nowhere
    pub excluded: usize,
}

/// Aggregator for computing count tables
pub struct Aggregator;

impl Aggregator {
    /// Count records per bucket, per status, and per value of `dimension`.
    ///
    /// One pass over `records`. Undated records are skipped and tallied in
    /// `excluded`. Blank dimension values count under `"Unknown"`. Group order
    /// in every table is the order values are first met while scanning.
    pub fn aggregate(
        records: &[Record],
        granularity: Granularity,
        dimension: &str,
    ) -> AggregatedCounts {
        let mut counts = AggregatedCounts {
            granularity,
            dimension: dimension.to_string(),
            total: CountTable::new(),
            by_status: GroupedCounts::new(),
            by_dimension: GroupedCounts::new(),
            by_status_and_dimension: StatusGroupedCounts::new(),
            excluded: 0,
        };

        for record in records {
            let (Some(year), Some(month)) = (record.year(), record.month()) else {
                counts.excluded += 1;
                continue;
            };

            let key = key_of(year, month, granularity);
            let group = record.dimension(dimension);

            counts.total.increment(&key);
            counts.by_dimension.increment(group, &key);

            if let Some(status) = record.status() {
                counts.by_status.increment(status, &key);
                counts
                    .by_status_and_dimension
                    .increment(status, group, &key);
            }
        }

        counts
    }
}
