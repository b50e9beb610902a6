use crate::{FrequencyRecord, PageRequest};

/// Why a pager stopped asking for pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The service returned no records for this page.
    EmptyPage { page: u32 },
    /// The leading record of this page fell under the threshold.
    BelowThreshold { page: u32, count: u64 },
    /// The configured page limit was reached; later pages may still qualify.
    PageLimit { pages: u32 },
}

/// What a fetched page turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Records(Vec<FrequencyRecord>),
    Finished(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerPhase {
    Fetching { page: u32 },
    Done(StopReason),
}

/// Page cursor for one key.
///
/// Relies on the service returning records in non-increasing count order:
/// once a page opens below the threshold nothing later can qualify, so the
/// pager stops without yielding that page. A stopped pager never restarts.
#[derive(Debug, Clone)]
pub struct Pager {
    key: String,
    page_size: u32,
    min_count: u64,
    max_pages: Option<u32>,
    phase: PagerPhase,
    pages_fetched: u32,
}

impl Pager {
    pub fn new(key: impl Into<String>, page_size: u32, min_count: u64) -> Self {
        Self {
            key: key.into(),
            page_size,
            min_count,
            max_pages: None,
            phase: PagerPhase::Fetching { page: 1 },
            pages_fetched: 0,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> PagerPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, PagerPhase::Done(_))
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            PagerPhase::Done(reason) => Some(reason),
            PagerPhase::Fetching { .. } => None,
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// The page to request next, or `None` once the pager has stopped.
    pub fn next_request(&self) -> Option<PageRequest> {
        match self.phase {
            PagerPhase::Fetching { page } => Some(self.request_for(page)),
            PagerPhase::Done(_) => None,
        }
    }

    pub fn request_for(&self, page: u32) -> PageRequest {
        PageRequest {
            key: self.key.clone(),
            page,
            page_size: self.page_size,
        }
    }

    /// Feeds the records returned for the current page.
    ///
    /// Yields the records to hand on to the selector, or the reason paging
    /// ended when this page triggered termination. A stopped pager keeps
    /// answering with the reason it stopped.
    pub fn admit(&mut self, records: Vec<FrequencyRecord>) -> Page {
        let page = match self.phase {
            PagerPhase::Fetching { page } => page,
            PagerPhase::Done(reason) => return Page::Finished(reason),
        };
        self.pages_fetched += 1;

        let Some(first) = records.first() else {
            return self.stop(StopReason::EmptyPage { page });
        };
        if first.count < self.min_count {
            let count = first.count;
            return self.stop(StopReason::BelowThreshold { page, count });
        }

        self.phase = match self.max_pages {
            Some(max) if page >= max => PagerPhase::Done(StopReason::PageLimit { pages: max }),
            _ => PagerPhase::Fetching { page: page + 1 },
        };
        Page::Records(records)
    }

    fn stop(&mut self, reason: StopReason) -> Page {
        self.phase = PagerPhase::Done(reason);
        Page::Finished(reason)
    }
}
