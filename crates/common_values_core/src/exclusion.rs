use std::collections::BTreeSet;

/// Global exclusions merged with the exclusions of a single key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExclusionUniverse {
    values: BTreeSet<String>,
}

impl ExclusionUniverse {
    pub fn new(global: &BTreeSet<String>, specific: &BTreeSet<String>) -> Self {
        Self {
            values: global.union(specific).cloned().collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Exclusions that were never met in `found`.
    pub fn missing_from(&self, found: &BTreeSet<String>) -> BTreeSet<String> {
        self.values.difference(found).cloned().collect()
    }
}
