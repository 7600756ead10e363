//! Dashboard configuration
//!
//! Read from `--config <path>`, else `~/.caseload/config.json`, else the
//! built-in defaults. Every field is optional in the file.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::services::normalizer::title_case;
use crate::types::{CaseloadError, Result};

const DEFAULT_PALETTE: [&str; 11] = [
    "#000", "#e91e63", "#ff9800", "#ffe600ff", "#4caf50", "#00bcd4", "#9c27b0", "#f44336",
    "#3f51b5", "#2196f3", "#795548",
];

const DEFAULT_STATUSES: [&str; 5] = ["Filed", "Dismissed", "Rejected", "Open", "Sentenced"];

const DEFAULT_METRIC_LABELS: [(&str, &str); 9] = [
    ("all", "All Cases Received"),
    ("all_cases", "All Cases Received"),
    ("accepted", "Accepted Cases"),
    ("rejected", "Rejected Cases"),
    ("Filed", "Cases Filed by Prosecutor"),
    ("Dismissed", "Dismissed by Court"),
    ("Rejected", "Declined to Prosecute"),
    ("Open", "Open Case"),
    ("Sentenced", "Sentenced"),
];

/// Imperial County, 2020 census
const DEFAULT_ETHNICITY_POPULATION: [(&str, u64); 6] = [
    ("Hispanic or Latino", 153_027),
    ("White", 16_813),
    ("Black or African American", 4_362),
    ("Asian", 3_049),
    ("American Indian and Alaska Native", 4_266),
    ("Native Hawaiian and Other Pacific Islander", 165),
];

/// Imperial County, 2020 census
const DEFAULT_AGE_POPULATION: [(&str, u64); 5] = [
    ("20–29", 26_169),
    ("30–39", 25_065),
    ("40–49", 20_257),
    ("50–59", 19_196),
    ("60+", 35_773),
];

fn population_table(rows: &[(&str, u64)]) -> IndexMap<String, u64> {
    rows.iter().map(|(k, n)| (k.to_string(), *n)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Series colors; index 0 is reserved for the aggregate series
    pub palette: Vec<String>,
    /// Status literals accepted as direct metrics
    pub statuses: Vec<String>,
    /// Statuses subtracted from the total to derive "accepted"
    pub rejected_statuses: Vec<String>,
    /// Display names by metric id
    pub metric_labels: IndexMap<String, String>,
    /// Reference population per share category ("ethnicity", "age", ...)
    pub population: IndexMap<String, IndexMap<String, u64>>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            statuses: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
            rejected_statuses: vec!["Rejected".to_string()],
            metric_labels: DEFAULT_METRIC_LABELS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            population: IndexMap::from([
                ("ethnicity".to_string(), population_table(&DEFAULT_ETHNICITY_POPULATION)),
                ("age".to_string(), population_table(&DEFAULT_AGE_POPULATION)),
            ]),
        }
    }
}

impl DashboardConfig {
    /// `~/.caseload/config.json`
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(".caseload").join("config.json"))
    }

    /// Load from an explicit path, else the default path, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve(explicit, Self::default_path())
    }

    fn resolve(explicit: Option<&Path>, fallback: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match fallback {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CaseloadError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CaseloadError::Config(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded dashboard config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(CaseloadError::Config("palette must not be empty".into()));
        }
        Ok(())
    }

    /// Reference population for a share category, if one is configured
    pub fn population_for(&self, category: &str) -> Option<&IndexMap<String, u64>> {
        self.population.get(category).filter(|table| !table.is_empty())
    }

    /// Display name for a metric id; unknown ids are title-cased
    pub fn metric_label(&self, metric: &str) -> String {
        match self.metric_labels.get(metric) {
            Some(label) => label.clone(),
            None => title_case(&metric.replace('_', " ")),
        }
    }
}
