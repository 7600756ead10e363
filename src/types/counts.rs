//! Count tables keyed by bucket key, dimension value and status
//!
//! Every table is backed by an [`IndexMap`] so iteration follows first-seen
//! order. Missing entries read as zero.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Bucket key → count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountTable(IndexMap<String, u64>);

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    /// Add `n` at `key`, inserting the key when first seen
    pub fn add(&mut self, key: &str, n: u64) {
        match self.0.get_mut(key) {
            Some(count) => *count = count.saturating_add(n),
            None => {
                self.0.insert(key.to_string(), n);
            }
        }
    }

    pub fn set(&mut self, key: impl Into<String>, count: u64) {
        self.0.insert(key.into(), count);
    }

    /// Count at `key`, zero when absent
    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn sum(&self) -> u64 {
        self.0.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for CountTable {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Dimension value → bucket key → count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedCounts(IndexMap<String, CountTable>);

impl GroupedCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, group: &str, key: &str) {
        self.entry(group).increment(key);
    }

    /// Table for `group`, inserted at the end when first seen
    pub fn entry(&mut self, group: &str) -> &mut CountTable {
        match self.0.get_index_of(group) {
            Some(idx) => &mut self.0[idx],
            None => self.0.entry(group.to_string()).or_default(),
        }
    }

    pub fn group(&self, group: &str) -> Option<&CountTable> {
        self.0.get(group)
    }

    /// Count of `group` at `key`, zero when either is absent
    pub fn get(&self, group: &str, key: &str) -> u64 {
        self.0.get(group).map_or(0, |t| t.get(key))
    }

    /// Group names in first-seen order
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountTable)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Sum over all groups at `key`
    pub fn total_at(&self, key: &str) -> u64 {
        self.0
            .values()
            .fold(0u64, |acc, t| acc.saturating_add(t.get(key)))
    }
}

/// Status → dimension value → bucket key → count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusGroupedCounts(IndexMap<String, GroupedCounts>);

impl StatusGroupedCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, status: &str, group: &str, key: &str) {
        let grouped = match self.0.get_index_of(status) {
            Some(idx) => &mut self.0[idx],
            None => self.0.entry(status.to_string()).or_default(),
        };
        grouped.increment(group, key);
    }

    pub fn status(&self, status: &str) -> Option<&GroupedCounts> {
        self.0.get(status)
    }

    pub fn get(&self, status: &str, group: &str, key: &str) -> u64 {
        self.0.get(status).map_or(0, |g| g.get(group, key))
    }

    pub fn statuses(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
