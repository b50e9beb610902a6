use std::collections::BTreeSet;

use serde::Deserialize;

/// One observed value for a key and how often the statistics service saw it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrequencyRecord {
    pub value: String,
    pub count: u64,
}

impl FrequencyRecord {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// A configured key: its threshold and the values barred for it alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub key: String,
    pub min_count: u64,
    pub exclusions: BTreeSet<String>,
}

impl KeySpec {
    pub fn new(key: impl Into<String>, min_count: u64) -> Self {
        Self {
            key: key.into(),
            min_count,
            exclusions: BTreeSet::new(),
        }
    }

    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = exclusions.into_iter().map(Into::into).collect();
        self
    }
}

/// Coordinates of a single page request; pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub key: String,
    pub page: u32,
    pub page_size: u32,
}
