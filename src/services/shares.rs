//! Demographic share comparisons
//!
//! Folds defendants onto a fixed category list and reports each category as
//! a percentage of declined defendants and of all defendants. A configured
//! population table adds the county's residents for comparison.

use std::collections::HashSet;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::services::config::DashboardConfig;
use crate::types::{Record, AGE};

const ETHNICITY_LABELS: [&str; 6] = [
    "Hispanic or Latino",
    "White",
    "Black or African American",
    "Asian",
    "American Indian and Alaska Native",
    "Native Hawaiian and Other Pacific Islander",
];

const AGE_LABELS: [&str; 5] = ["20–29", "30–39", "40–49", "50–59", "60+"];

const GENDER_LABELS: [&str; 3] = ["Male", "Female", "Other / Unknown"];

const DECLINED_COLOR: &str = "#c2185b";
const DEFENDANTS_COLOR: &str = "#007acc";
const POPULATION_COLOR: &str = "#ff9800";

/// Demographic axis a comparison is drawn over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShareCategory {
    Ethnicity,
    Age,
    Gender,
}

impl ShareCategory {
    /// Key of this category's population table in the config
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethnicity => "ethnicity",
            Self::Age => "age",
            Self::Gender => "gender",
        }
    }

    /// Fixed, ordered category list
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Ethnicity => &ETHNICITY_LABELS,
            Self::Age => &AGE_LABELS,
            Self::Gender => &GENDER_LABELS,
        }
    }

    /// Category a defendant falls in; `None` leaves the defendant out of
    /// every share for this axis.
    pub fn fold(&self, defendant: &Record) -> Option<&'static str> {
        match self {
            Self::Ethnicity => census_ethnicity(defendant.dimension("ethnicity")),
            Self::Age => census_age_group(defendant.measure(AGE)),
            Self::Gender => Some(binary_gender(defendant.dimension("gender"))),
        }
    }
}

/// Fold free-text ethnicity onto the six census categories
pub fn census_ethnicity(raw: &str) -> Option<&'static str> {
    let eth = raw.to_lowercase();
    if eth.contains("white") {
        Some("White")
    } else if eth.contains("black") {
        Some("Black or African American")
    } else if eth.contains("asian") {
        Some("Asian")
    } else if eth.contains("hispanic") || eth.contains("latino") {
        Some("Hispanic or Latino")
    } else if eth.contains("american indian") || eth.contains("alaska") {
        Some("American Indian and Alaska Native")
    } else if eth.contains("hawaiian") || eth.contains("pacific") {
        Some("Native Hawaiian and Other Pacific Islander")
    } else {
        None
    }
}

/// Ten-year age bands from 20; under-20s are not compared
pub fn census_age_group(age: Option<f64>) -> Option<&'static str> {
    let age = age.filter(|a| a.is_finite())?;
    match age {
        a if a < 20.0 => None,
        a if a < 30.0 => Some("20–29"),
        a if a < 40.0 => Some("30–39"),
        a if a < 50.0 => Some("40–49"),
        a if a < 60.0 => Some("50–59"),
        _ => Some("60+"),
    }
}

pub fn binary_gender(raw: &str) -> &'static str {
    let text = raw.trim().to_lowercase();
    if text.starts_with('m') {
        "Male"
    } else if text.starts_with('f') {
        "Female"
    } else {
        "Other / Unknown"
    }
}

/// Ids of cases whose status is one of the configured rejected statuses,
/// compared case-insensitively
pub fn rejected_case_ids(cases: &[Record], config: &DashboardConfig) -> HashSet<i64> {
    let rejected: Vec<String> = config
        .rejected_statuses
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    cases
        .iter()
        .filter(|case| {
            case.status()
                .is_some_and(|status| rejected.contains(&status.to_lowercase()))
        })
        .map(|case| case.id)
        .collect()
}

/// Percentages of one population across the category list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSeries {
    pub label: String,
    pub color: String,
    /// Members counted in any category
    pub count: u64,
    /// Percent per category, aligned to the comparison's labels
    pub shares: Vec<f64>,
}

impl ShareSeries {
    fn from_counts(label: &str, color: &str, labels: &[&str], counts: &IndexMap<&str, u64>) -> Self {
        let count: u64 = labels.iter().map(|k| counts.get(*k).copied().unwrap_or(0)).sum();
        let denominator = count.max(1) as f64;
        Self {
            label: label.to_string(),
            color: color.to_string(),
            count,
            shares: labels
                .iter()
                .map(|k| counts.get(*k).copied().unwrap_or(0) as f64 / denominator * 100.0)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareComparison {
    pub category: ShareCategory,
    pub labels: Vec<String>,
    pub series: Vec<ShareSeries>,
}

impl ShareComparison {
    pub fn series(&self, label: &str) -> Option<&ShareSeries> {
        self.series.iter().find(|s| s.label == label)
    }
}

/// Share comparison service
pub struct ShareAnalyzer;

impl ShareAnalyzer {
    /// Compare declined defendants against all defendants, and against the
    /// configured population for `category` when there is one.
    ///
    /// A defendant counts as declined when its case id is in `declined`.
    /// Empty populations report zero shares instead of dividing by zero.
    pub fn compare(
        category: ShareCategory,
        defendants: &[Record],
        declined: &HashSet<i64>,
        config: &DashboardConfig,
    ) -> ShareComparison {
        let labels = category.labels();

        let mut all: IndexMap<&str, u64> = IndexMap::new();
        let mut rejected: IndexMap<&str, u64> = IndexMap::new();
        let mut unmatched = 0usize;
        for defendant in defendants {
            let Some(group) = category.fold(defendant) else {
                unmatched += 1;
                continue;
            };
            *all.entry(group).or_default() += 1;
            if declined.contains(&defendant.id) {
                *rejected.entry(group).or_default() += 1;
            }
        }
        if unmatched > 0 {
            tracing::debug!(
                category = category.as_str(),
                unmatched,
                "defendants outside the compared categories"
            );
        }

        let mut series = vec![
            ShareSeries::from_counts("Declined", DECLINED_COLOR, labels, &rejected),
            ShareSeries::from_counts("All Defendants", DEFENDANTS_COLOR, labels, &all),
        ];

        if let Some(table) = config.population_for(category.as_str()) {
            let population: IndexMap<&str, u64> = labels
                .iter()
                .map(|k| (*k, table.get(*k).copied().unwrap_or(0)))
                .collect();
            series.push(ShareSeries::from_counts(
                "Population",
                POPULATION_COLOR,
                labels,
                &population,
            ));
        }

        ShareComparison {
            category,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            series,
        }
    }
}
