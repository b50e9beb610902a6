//! Common values core: pure paging and selection logic, free of IO.
mod exclusion;
mod pager;
mod record;
mod selector;
mod shape;

pub use exclusion::ExclusionUniverse;
pub use pager::{Page, Pager, PagerPhase, StopReason};
pub use record::{FrequencyRecord, KeySpec, PageRequest};
pub use selector::{
    CandidateSelector, EmptyCandidateList, RejectionCounts, Selection, Verdict,
};
pub use shape::{ValuePredicate, ValueShape, DEFAULT_SEPARATOR};
