use std::collections::BTreeSet;

use crate::{ExclusionUniverse, FrequencyRecord, KeySpec, ValuePredicate};

/// Outcome of offering one record to a [`CandidateSelector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    BelowThreshold,
    InvalidShape,
    Excluded,
}

/// How many records were turned away, per reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RejectionCounts {
    pub below_threshold: usize,
    pub invalid_shape: usize,
    pub excluded: usize,
}

/// A key that ended up without a single usable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no valid values for key {key}")]
pub struct EmptyCandidateList {
    pub key: String,
}

/// Filters records into an ordered candidate list for one key.
///
/// Checks run in order and the first failure rejects the record: threshold,
/// value shape, exclusion. Accepted values keep their arrival order.
pub struct CandidateSelector<'p> {
    key: String,
    min_count: u64,
    universe: ExclusionUniverse,
    predicate: &'p dyn ValuePredicate,
    candidates: Vec<String>,
    found: BTreeSet<String>,
    rejected: RejectionCounts,
}

impl<'p> CandidateSelector<'p> {
    pub fn new(
        spec: &KeySpec,
        global_exclusions: &BTreeSet<String>,
        predicate: &'p dyn ValuePredicate,
    ) -> Self {
        Self {
            key: spec.key.clone(),
            min_count: spec.min_count,
            universe: ExclusionUniverse::new(global_exclusions, &spec.exclusions),
            predicate,
            candidates: Vec::new(),
            found: BTreeSet::new(),
            rejected: RejectionCounts::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn universe(&self) -> &ExclusionUniverse {
        &self.universe
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn offer(&mut self, record: FrequencyRecord) -> Verdict {
        // Guards against pages that are not sorted by count.
        if record.count < self.min_count {
            self.rejected.below_threshold += 1;
            return Verdict::BelowThreshold;
        }
        if !self.predicate.is_valid(&record.value) {
            self.rejected.invalid_shape += 1;
            return Verdict::InvalidShape;
        }
        if self.universe.contains(&record.value) {
            self.rejected.excluded += 1;
            self.found.insert(record.value);
            return Verdict::Excluded;
        }
        self.candidates.push(record.value);
        Verdict::Accepted
    }

    pub fn extend<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = FrequencyRecord>,
    {
        for record in records {
            self.offer(record);
        }
    }

    pub fn finish(self) -> Selection {
        let not_found = self.universe.missing_from(&self.found);
        Selection {
            key: self.key,
            candidates: self.candidates,
            found_exclusions: self.found,
            not_found,
            rejected: self.rejected,
        }
    }
}

/// Final result of selection for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub key: String,
    /// Accepted values in the order the service returned them.
    pub candidates: Vec<String>,
    /// Exclusions actually met at or above the threshold.
    pub found_exclusions: BTreeSet<String>,
    /// Exclusions configured for the key but never met.
    pub not_found: BTreeSet<String>,
    pub rejected: RejectionCounts,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn require_candidates(&self) -> Result<&[String], EmptyCandidateList> {
        if self.candidates.is_empty() {
            return Err(EmptyCandidateList {
                key: self.key.clone(),
            });
        }
        Ok(&self.candidates)
    }
}
