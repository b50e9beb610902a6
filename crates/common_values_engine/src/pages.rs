use common_values_core::{Page, Pager, PagerPhase};
use engine_logging::engine_trace;

use crate::{FetchError, StatsSource};

/// Pull-based producer of record pages for one key.
///
/// Each call to [`PageFetcher::next_page`] issues at most one request. Once it
/// has answered [`Page::Finished`] it keeps doing so without touching the
/// network again.
pub struct PageFetcher<'a> {
    source: &'a dyn StatsSource,
    pager: Pager,
}

impl<'a> PageFetcher<'a> {
    pub fn new(source: &'a dyn StatsSource, pager: Pager) -> Self {
        Self { source, pager }
    }

    pub async fn next_page(&mut self) -> Result<Page, FetchError> {
        let page = match self.pager.phase() {
            PagerPhase::Fetching { page } => page,
            PagerPhase::Done(reason) => return Ok(Page::Finished(reason)),
        };
        let request = self.pager.request_for(page);
        let records = self.source.fetch_page(&request).await?;
        engine_trace!(
            "Page {} for key {} returned {} records",
            request.page,
            request.key,
            records.len()
        );
        Ok(self.pager.admit(records))
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pager.pages_fetched()
    }
}
