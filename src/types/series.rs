//! Output series consumed by the rendering layer

use serde::{Deserialize, Serialize};

/// One plotted line, values aligned positionally with the bucket list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub color: String,
    pub values: Vec<u64>,
}

impl Series {
    /// Value at the latest bucket (the headline number of a chart box)
    pub fn latest(&self) -> Option<u64> {
        self.values.last().copied()
    }

    pub fn total(&self) -> u64 {
        self.values.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }
}

/// One wedge of a single-bucket categorical breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceEntry {
    pub label: String,
    pub count: u64,
    pub color: String,
}
