//! End-to-end checks over the public library API

use caseload::services::{
    attach_defendants, key_of, normalize_rows, rejected_case_ids, Aggregator, BreakdownComposer,
    BucketGenerator, Dashboard, DashboardConfig, Interval, MetricCatalog, ProcessingStats,
    RawRow, ShareAnalyzer, ShareCategory, ViewRequest,
};
use caseload::types::{CaseloadError, Dataset, Granularity, Record};
use chrono::NaiveDate;

fn make_record(year: i32, month: u32, status: &str, dim: &str) -> Record {
    Record::new(1, NaiveDate::from_ymd_opt(year, month, 1))
        .with_status(status)
        .with_dimension("dim", dim)
}

fn scenario() -> Vec<Record> {
    vec![
        make_record(2024, 1, "Filed", "A"),
        make_record(2024, 1, "Rejected", "B"),
        make_record(2024, 2, "Filed", "A"),
    ]
}

fn load_rows(name: &str, dataset: Dataset) -> Vec<Record> {
    let content = std::fs::read_to_string(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name),
    )
    .unwrap();
    let rows: Vec<RawRow> = serde_json::from_str(&content).unwrap();
    normalize_rows(&rows, dataset).records
}

fn load_fixture() -> Vec<Record> {
    load_rows("cases.json", Dataset::Cases)
}

fn load_defendants() -> Vec<Record> {
    load_rows("defendants.json", Dataset::Defendants)
}

#[test]
fn test_scenario_monthly_pipeline() {
    let records = scenario();
    let config = DashboardConfig::default();
    let catalog = MetricCatalog::new(&config);

    let buckets = BucketGenerator::generate(&records, Granularity::Monthly).unwrap();
    let counts = Aggregator::aggregate(&records, Granularity::Monthly, "dim");

    assert_eq!(buckets.len(), 12);
    assert_eq!(counts.total.get("2024-1"), 2);
    assert_eq!(counts.total.get("2024-2"), 1);
    for bucket in &buckets[2..] {
        assert_eq!(counts.total.get(&bucket.key), 0);
    }

    let accepted = catalog.resolve("accepted", &counts, Dataset::Cases);
    assert_eq!(accepted.bucket_counts.get("2024-1"), 1);
    assert_eq!(accepted.bucket_counts.get("2024-2"), 1);

    let all = catalog.resolve("all", &counts, Dataset::Cases);
    let series = BreakdownComposer::new(&config.palette).compose(&buckets, &all, "All Cases");

    assert_eq!(series.len(), 3);
    assert_eq!(series[1].label, "A");
    assert_eq!(series[1].values[..3], [1, 1, 0]);
    assert_eq!(series[2].label, "B");
    assert_eq!(series[2].values[..3], [1, 0, 0]);
    assert!(series.iter().all(|s| s.values.len() == 12));
}

#[test]
fn test_scenario_unknown_metric() {
    let counts = Aggregator::aggregate(&scenario(), Granularity::Monthly, "dim");
    let catalog = MetricCatalog::new(&DashboardConfig::default());

    let resolved = catalog.resolve("not_a_real_metric", &counts, Dataset::Cases);

    assert!(resolved.bucket_counts.is_empty());
    assert!(resolved.group_counts.is_empty());
}

#[test]
fn test_trailing_twelve_boundary() {
    let mut records: Vec<Record> = (1..=12)
        .map(|m| make_record(2023, m, "Filed", "A"))
        .collect();
    records.extend((1..=3).map(|m| make_record(2024, m, "Filed", "A")));

    let buckets = BucketGenerator::generate(&records, Granularity::Last12).unwrap();

    assert_eq!(buckets.len(), 12);
    assert_eq!(buckets[0].key, "2023-4");
    assert_eq!(buckets[11].key, "2024-3");
    let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
    assert!(keys.contains(&"2023-12"));
    assert!(keys.contains(&"2024-1"));

    // Records before the window land in no bucket
    let counts = Aggregator::aggregate(&records, Granularity::Last12, "dim");
    let in_view: u64 = buckets.iter().map(|b| counts.total.get(&b.key)).sum();
    assert_eq!(in_view, 12);
}

#[test]
fn test_empty_input_policy() {
    let err = BucketGenerator::generate(&[], Granularity::Last12).unwrap_err();
    assert!(matches!(err, CaseloadError::EmptyInput(_)));
    assert!(BucketGenerator::generate(&[], Granularity::Annual)
        .unwrap()
        .is_empty());
}

#[test]
fn test_key_of_matches_generated_buckets() {
    let records = load_fixture();
    for granularity in [
        Granularity::Last12,
        Granularity::Monthly,
        Granularity::Quarterly,
        Granularity::Annual,
    ] {
        let buckets = BucketGenerator::generate(&records, granularity).unwrap();
        for record in records.iter().filter(|r| r.received.is_some()) {
            let key = key_of(record.year().unwrap(), record.month().unwrap(), granularity);
            let hits = buckets.iter().filter(|b| b.key == key).count();
            assert_eq!(hits, 1, "{} under {}", key, granularity);
        }
    }
}

#[test]
fn test_fixture_normalization() {
    let records = load_fixture();

    // "Access Denied" row dropped, undated row kept
    assert_eq!(records.len(), 6);
    assert!(records.iter().any(|r| r.received.is_none()));
    assert_eq!(records[0].dimension("agency"), "El Centro Police Department");
    assert_eq!(records[0].dimension("sub_type"), "Domestic Violence");
    assert_eq!(records[3].dimension("severity"), "Violation of Probation");
}

#[test]
fn test_fixture_dashboard_view() {
    let records = load_fixture();
    let request = ViewRequest {
        dataset: Dataset::Cases,
        granularity: Granularity::Annual,
        dimension: "agency".into(),
        metric: "accepted".into(),
        slice_bucket: None,
    };

    let view = Dashboard::default().build(&records, &request).unwrap();

    assert_eq!(view.labels, vec!["2023", "2024"]);
    assert_eq!(view.excluded, 1);
    // 2023: one dismissed case; 2024: four cases, two rejected
    assert_eq!(view.series[0].values, vec![1, 2]);
    assert_eq!(view.series[1].label, "El Centro Police Department");
    assert_eq!(view.series[1].values, vec![0, 2]);
    // Accepted 2024 cases all came from El Centro
    let slice = view.slice.as_ref().unwrap();
    assert_eq!(slice.bucket_key, "2024");
    assert_eq!(slice.entries.len(), 1);
    assert_eq!(slice.entries[0].label, "El Centro Police Department");
    assert_eq!(slice.entries[0].count, 2);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["title"], "Accepted Cases");
    assert_eq!(json["series"][0]["color"], "#000");
}

#[test]
fn test_fixture_status_dimension() {
    let records = load_fixture();
    let request = ViewRequest {
        dataset: Dataset::Cases,
        granularity: Granularity::Quarterly,
        dimension: "status".into(),
        metric: "all".into(),
        slice_bucket: Some("2024-Q1".into()),
    };

    let view = Dashboard::default().build(&records, &request).unwrap();

    let slice = view.slice.as_ref().unwrap();
    let labels: Vec<&str> = slice.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Filed", "Rejected"]);
    assert_eq!(slice.entries[0].count, 2);
    assert_eq!(slice.entries[1].count, 2);
}

#[test]
fn test_fixture_accepted_slice() {
    let records = load_fixture();
    let request = ViewRequest {
        dataset: Dataset::Cases,
        granularity: Granularity::Annual,
        dimension: "severity".into(),
        metric: "accepted".into(),
        slice_bucket: Some("2024".into()),
    };

    let view = Dashboard::default().build(&records, &request).unwrap();

    // 2024 accepted: 1001 and 1003, both felonies
    let slice = view.slice.as_ref().unwrap();
    assert_eq!(slice.entries.len(), 1);
    assert_eq!(slice.entries[0].label, "Felony");
    assert_eq!(slice.entries[0].count, 2);
}

#[test]
fn test_fixture_processing_days() {
    let records = load_fixture();

    let view = ProcessingStats::compute(&records, Granularity::Monthly, Interval::ToFile).unwrap();

    let at = |key: &str| {
        let i = view.buckets.iter().position(|b| b.key == key).unwrap();
        (view.mean[i], view.median[i])
    };
    // 1002's zero is not a sample
    assert_eq!(at("2024-1"), (Some(10.0), Some(10.0)));
    assert_eq!(at("2024-2"), (Some(4.0), Some(4.0)));
    assert_eq!(at("2024-3"), (None, None));
    assert_eq!(view.samples.iter().sum::<usize>(), 2);
}

#[test]
fn test_fixture_defendants_joined_onto_cases() {
    let mut cases = load_fixture();
    let defendants = load_defendants();
    assert_eq!(defendants.len(), 4);

    let matched = attach_defendants(&mut cases, &defendants);
    assert_eq!(matched, 4);

    let request = ViewRequest {
        dataset: Dataset::Cases,
        granularity: Granularity::Annual,
        dimension: "ethnicity".into(),
        metric: "rejected".into(),
        slice_bucket: None,
    };
    let view = Dashboard::default().build(&cases, &request).unwrap();

    let slice = view.slice.as_ref().unwrap();
    let entries: Vec<(&str, u64)> = slice
        .entries
        .iter()
        .map(|e| (e.label.as_str(), e.count))
        .collect();
    assert_eq!(entries, vec![("White", 1), ("Hispanic", 1)]);
}

#[test]
fn test_fixture_declined_ethnicity_shares() {
    let config = DashboardConfig::default();
    let declined = rejected_case_ids(&load_fixture(), &config);
    assert_eq!(declined.len(), 2);

    let comparison =
        ShareAnalyzer::compare(ShareCategory::Ethnicity, &load_defendants(), &declined, &config);

    let declined = comparison.series("Declined").unwrap();
    assert_eq!(declined.count, 2);
    assert_eq!(declined.shares[0], 50.0);
    assert_eq!(declined.shares[1], 50.0);

    // 1004's "Declined to state" falls outside the census categories
    let all = comparison.series("All Defendants").unwrap();
    assert_eq!(all.count, 3);
    assert!((all.shares[0] - 200.0 / 3.0).abs() < 1e-9);

    for series in &comparison.series {
        let sum: f64 = series.shares.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }
}
