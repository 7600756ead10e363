//! Record types for case and defendant events

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{CaseloadError, Result};

/// Sentinel category for absent or empty dimension values
pub const UNKNOWN: &str = "Unknown";

/// Measure: days from receipt to the charge-filing request
pub const DAYS_TO_FILE: &str = "days_to_file";
/// Measure: days from filed charges to sentencing
pub const DAYS_FILE_TO_SENT: &str = "days_file_to_sent";
/// Measure: defendant age in years
pub const AGE: &str = "age";

/// One normalized case or defendant event.
///
/// Records are produced once by the normalizer and never mutated by the
/// engine. `received` is `None` when the source date could not be parsed;
/// such records stay in the collection but land in no bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: i64,
    pub received: Option<NaiveDate>,
    /// Case lifecycle status (cases only)
    #[serde(default)]
    pub status: Option<String>,
    /// Categorical attributes keyed by field name (agency, ethnicity, ...).
    ///
    /// A `"status"` key here is never read: [`Record::dimension`] answers
    /// `"status"` from the `status` field.
    #[serde(default)]
    pub dimensions: IndexMap<String, String>,
    /// Numeric attributes (processing durations, defendant age)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub measures: IndexMap<String, f64>,
}

impl Record {
    pub fn new(id: i64, received: Option<NaiveDate>) -> Self {
        Self {
            id,
            received,
            status: None,
            dimensions: IndexMap::new(),
            measures: IndexMap::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set a categorical field. `"status"` is shadowed by the status field,
    /// use [`Record::with_status`] for it.
    pub fn with_dimension(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(field.into(), value.into());
        self
    }

    pub fn with_measure(mut self, name: impl Into<String>, value: f64) -> Self {
        self.measures.insert(name.into(), value);
        self
    }

    /// Numeric field, `None` when absent or not finite
    pub fn measure(&self, name: &str) -> Option<f64> {
        self.measures.get(name).copied().filter(|v| v.is_finite())
    }

    pub fn year(&self) -> Option<i32> {
        self.received.map(|d| d.year())
    }

    /// Calendar month, 1-based
    pub fn month(&self) -> Option<u32> {
        self.received.map(|d| d.month())
    }

    pub fn quarter(&self) -> Option<u32> {
        self.received.map(|d| d.month0() / 3 + 1)
    }

    /// Status if present and non-blank
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Value of a categorical field, `"Unknown"` when absent or blank.
    ///
    /// `"status"` is addressable as a dimension too, so cases can be split by
    /// their own lifecycle state.
    pub fn dimension(&self, field: &str) -> &str {
        let value = if field == "status" {
            self.status.as_deref()
        } else {
            self.dimensions.get(field).map(String::as_str)
        };
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => UNKNOWN,
        }
    }
}

/// Which record universe a request runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Cases,
    Defendants,
}

impl Dataset {
    /// Whether records of this universe carry a status
    pub fn has_status(&self) -> bool {
        matches!(self, Self::Cases)
    }

    /// Dimension fields a caller may split this dataset by
    pub fn dimensions(&self) -> &'static [&'static str] {
        match self {
            Self::Cases => &[
                "severity",
                "agency",
                "city",
                "status",
                "sub_type",
                "victim_case",
            ],
            Self::Defendants => &["ethnicity", "gender", "county_res", "age_group"],
        }
    }

    /// Label of the aggregate series
    pub fn all_label(&self) -> &'static str {
        match self {
            Self::Cases => "All Cases",
            Self::Defendants => "All Defendants",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Cases => "cases",
            Self::Defendants => "defendants",
        }
    }
}

impl std::str::FromStr for Dataset {
    type Err = CaseloadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cases" => Ok(Self::Cases),
            "defendants" => Ok(Self::Defendants),
            other => Err(CaseloadError::Parse(format!("unknown dataset: {}", other))),
        }
    }
}
