//! Bucket generation and the shared bucket-key mapping
//!
//! [`key_of`] is the only place a bucket key is built. The generator uses it
//! to name buckets and the aggregator uses it to classify records, so a
//! record inside the generated range always hits exactly one bucket.

use std::collections::BTreeSet;

use chrono::Datelike;

use crate::types::{Bucket, CaseloadError, Granularity, Record, Result};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a calendar month (1-based) to its bucket key under `granularity`.
///
/// - monthly, last12: `"2024-3"`
/// - quarterly: `"2024-Q1"`
/// - annual: `"2024"`
pub fn key_of(year: i32, month: u32, granularity: Granularity) -> String {
    match granularity {
        Granularity::Monthly | Granularity::Last12 => format!("{}-{}", year, month),
        Granularity::Quarterly => format!("{}-Q{}", year, quarter_of(month)),
        Granularity::Annual => year.to_string(),
    }
}

/// ceil(month / 3)
fn quarter_of(month: u32) -> u32 {
    month.div_ceil(3)
}

fn short_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

fn month_bucket(year: i32, month: u32, granularity: Granularity) -> Bucket {
    Bucket {
        key: key_of(year, month, granularity),
        label: format!("{} '{}", MONTH_NAMES[(month - 1) as usize], short_year(year)),
        year,
        month: Some(month),
        quarter: Some(quarter_of(month)),
    }
}

/// Builds the ordered x-axis for a record collection
pub struct BucketGenerator;

impl BucketGenerator {
    /// Generate buckets in chronological order.
    ///
    /// Only records with a usable date contribute years or the trailing
    /// anchor. `Last12` with no such record fails with `EmptyInput`; the
    /// other granularities return an empty list.
    pub fn generate(records: &[Record], granularity: Granularity) -> Result<Vec<Bucket>> {
        match granularity {
            Granularity::Last12 => Self::trailing_months(records),
            Granularity::Monthly => Ok(Self::years(records)
                .into_iter()
                .flat_map(|year| (1..=12).map(move |m| month_bucket(year, m, granularity)))
                .collect()),
            Granularity::Quarterly => Ok(Self::years(records)
                .into_iter()
                .flat_map(|year| {
                    (1..=4u32).map(move |q| Bucket {
                        key: key_of(year, q * 3, granularity),
                        label: format!("Q{} '{}", q, short_year(year)),
                        year,
                        month: None,
                        quarter: Some(q),
                    })
                })
                .collect()),
            Granularity::Annual => Ok(Self::years(records)
                .into_iter()
                .map(|year| Bucket {
                    key: key_of(year, 1, granularity),
                    label: year.to_string(),
                    year,
                    month: None,
                    quarter: None,
                })
                .collect()),
        }
    }

    /// Distinct observed years, ascending
    fn years(records: &[Record]) -> BTreeSet<i32> {
        records.iter().filter_map(Record::year).collect()
    }

    /// Twelve months ending at the month of the latest dated record
    fn trailing_months(records: &[Record]) -> Result<Vec<Bucket>> {
        let anchor = records
            .iter()
            .filter_map(|r| r.received)
            .max()
            .ok_or_else(|| {
                CaseloadError::EmptyInput(
                    "trailing 12 months needs at least one dated record".into(),
                )
            })?;

        let anchor_month0 = anchor.month0() as i32;
        let buckets = (0..12)
            .rev()
            .map(|back| {
                let offset = anchor_month0 - back;
                let year = anchor.year() + offset.div_euclid(12);
                let month = offset.rem_euclid(12) as u32 + 1;
                month_bucket(year, month, Granularity::Last12)
            })
            .collect();
        Ok(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_record(year: i32, month: u32, day: u32) -> Record {
        Record::new(1, NaiveDate::from_ymd_opt(year, month, day))
    }

    fn keys(buckets: &[Bucket]) -> Vec<&str> {
        buckets.iter().map(|b| b.key.as_str()).collect()
    }

    // ========== key_of() tests ==========

    #[test]
    fn test_key_of_monthly() {
        assert_eq!(key_of(2024, 3, Granularity::Monthly), "2024-3");
        assert_eq!(key_of(2024, 12, Granularity::Monthly), "2024-12");
    }

    #[test]
    fn test_key_of_last12_matches_monthly() {
        for m in 1..=12 {
            assert_eq!(
                key_of(2023, m, Granularity::Last12),
                key_of(2023, m, Granularity::Monthly)
            );
        }
    }

    #[test]
    fn test_key_of_quarterly() {
        assert_eq!(key_of(2024, 1, Granularity::Quarterly), "2024-Q1");
        assert_eq!(key_of(2024, 3, Granularity::Quarterly), "2024-Q1");
        assert_eq!(key_of(2024, 4, Granularity::Quarterly), "2024-Q2");
        assert_eq!(key_of(2024, 12, Granularity::Quarterly), "2024-Q4");
    }

    #[test]
    fn test_key_of_annual() {
        assert_eq!(key_of(2024, 7, Granularity::Annual), "2024");
    }

    // ========== generate() tests ==========

    #[test]
    fn test_last12_crosses_year_boundary() {
        let records = vec![
            make_record(2023, 1, 4),
            make_record(2024, 3, 15),
            make_record(2023, 8, 30),
        ];

        let buckets = BucketGenerator::generate(&records, Granularity::Last12).unwrap();

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].key, "2023-4");
        assert_eq!(buckets[0].label, "Apr '23");
        assert_eq!(buckets[8].key, "2023-12");
        assert_eq!(buckets[9].key, "2024-1");
        assert_eq!(buckets[11].key, "2024-3");
        assert_eq!(buckets[11].label, "Mar '24");
    }

    #[test]
    fn test_last12_anchor_in_december() {
        let records = vec![make_record(2022, 12, 31)];
        let buckets = BucketGenerator::generate(&records, Granularity::Last12).unwrap();
        assert_eq!(buckets.first().unwrap().key, "2022-1");
        assert_eq!(buckets.last().unwrap().key, "2022-12");
    }

    #[test]
    fn test_last12_empty_is_error() {
        let err = BucketGenerator::generate(&[], Granularity::Last12).unwrap_err();
        assert!(matches!(err, CaseloadError::EmptyInput(_)));
    }

    #[test]
    fn test_last12_only_undated_is_error() {
        let records = vec![Record::new(1, None), Record::new(2, None)];
        let result = BucketGenerator::generate(&records, Granularity::Last12);
        assert!(matches!(result, Err(CaseloadError::EmptyInput(_))));
    }

    #[test]
    fn test_empty_input_other_granularities() {
        for granularity in [
            Granularity::Monthly,
            Granularity::Quarterly,
            Granularity::Annual,
        ] {
            let buckets = BucketGenerator::generate(&[], granularity).unwrap();
            assert!(buckets.is_empty());
        }
    }

    #[test]
    fn test_monthly_dense_per_year() {
        let records = vec![make_record(2024, 6, 1), make_record(2022, 2, 1)];

        let buckets = BucketGenerator::generate(&records, Granularity::Monthly).unwrap();

        // 2022 and 2024, no 2023
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[0].key, "2022-1");
        assert_eq!(buckets[0].label, "Jan '22");
        assert_eq!(buckets[11].key, "2022-12");
        assert_eq!(buckets[12].key, "2024-1");
        assert_eq!(buckets[23].key, "2024-12");
    }

    #[test]
    fn test_quarterly_buckets() {
        let records = vec![make_record(2024, 6, 1)];
        let buckets = BucketGenerator::generate(&records, Granularity::Quarterly).unwrap();
        assert_eq!(keys(&buckets), vec!["2024-Q1", "2024-Q2", "2024-Q3", "2024-Q4"]);
        assert_eq!(buckets[2].label, "Q3 '24");
        assert_eq!(buckets[2].quarter, Some(3));
    }

    #[test]
    fn test_annual_ascending_distinct() {
        let records = vec![
            make_record(2024, 6, 1),
            make_record(2019, 1, 1),
            make_record(2024, 1, 1),
            Record::new(9, None),
        ];
        let buckets = BucketGenerator::generate(&records, Granularity::Annual).unwrap();
        assert_eq!(keys(&buckets), vec!["2019", "2024"]);
        assert_eq!(buckets[1].label, "2024");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let records = vec![make_record(2021, 5, 1), make_record(2023, 9, 9)];
        for granularity in [
            Granularity::Last12,
            Granularity::Monthly,
            Granularity::Quarterly,
            Granularity::Annual,
        ] {
            let a = BucketGenerator::generate(&records, granularity).unwrap();
            let b = BucketGenerator::generate(&records, granularity).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_bucket_keys_unique() {
        let records = vec![make_record(2021, 5, 1), make_record(2023, 9, 9)];
        let buckets = BucketGenerator::generate(&records, Granularity::Monthly).unwrap();
        let unique: BTreeSet<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(unique.len(), buckets.len());
    }

    #[test]
    fn test_every_record_key_matches_one_bucket() {
        let records: Vec<Record> = (1..=12)
            .map(|m| make_record(2020 + (m as i32 % 3), m, 10))
            .collect();
        for granularity in [
            Granularity::Monthly,
            Granularity::Quarterly,
            Granularity::Annual,
        ] {
            let buckets = BucketGenerator::generate(&records, granularity).unwrap();
            for record in &records {
                let key = key_of(record.year().unwrap(), record.month().unwrap(), granularity);
                let hits = buckets.iter().filter(|b| b.key == key).count();
                assert_eq!(hits, 1, "{} under {}", key, granularity);
            }
        }
    }
}
