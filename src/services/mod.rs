//! Services for bucketing, aggregation, series composition and the
//! processing-time and demographic-share views

pub mod aggregator;
pub mod breakdown;
pub mod buckets;
pub mod config;
pub mod dashboard;
pub mod metrics;
pub mod normalizer;
pub mod processing;
pub mod shares;

pub use aggregator::{AggregatedCounts, Aggregator};
pub use breakdown::BreakdownComposer;
pub use buckets::{key_of, BucketGenerator};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardView, SliceView, ViewRequest};
pub use metrics::{Formula, Metric, MetricCatalog, ResolvedMetric};
pub use normalizer::{attach_defendants, normalize_rows, NormalizeOutcome, RawRow};
pub use processing::{Interval, ProcessingStats, ProcessingView};
pub use shares::{rejected_case_ids, ShareAnalyzer, ShareCategory, ShareComparison, ShareSeries};
