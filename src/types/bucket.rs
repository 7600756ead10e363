//! Time bucket types

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{CaseloadError, Result};

/// Time-bucketing resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Granularity {
    /// Twelve consecutive months ending at the latest record
    #[serde(rename = "last12")]
    #[value(name = "last12")]
    Last12,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "annual")]
    Annual,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last12 => "last12",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Granularity {
    type Err = CaseloadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "last12" => Ok(Self::Last12),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" => Ok(Self::Annual),
            other => Err(CaseloadError::Parse(format!(
                "unknown granularity: {}",
                other
            ))),
        }
    }
}

/// One time window of a generated bucket list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Unique within one bucket list; matches the aggregator's record keys
    pub key: String,
    /// Display label ("Mar '24", "Q1 '24", "2024")
    pub label: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
}
