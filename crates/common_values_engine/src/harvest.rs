use std::collections::BTreeSet;

use common_values_core::{
    CandidateSelector, KeySpec, Page, Pager, Selection, StopReason, ValuePredicate,
};
use engine_logging::{engine_debug, engine_warn};

use crate::pages::PageFetcher;
use crate::{FetchError, StatsSource};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSettings {
    pub page_size: u32,
    pub max_pages: Option<u32>,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("statistics service unavailable for key {key}: {source}")]
    ServiceUnavailable {
        key: String,
        #[source]
        source: FetchError,
    },
}

/// Everything learned about one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHarvest {
    pub selection: Selection,
    pub stop_reason: StopReason,
    pub pages_fetched: u32,
}

/// Fetch and filter every qualifying page for one key.
pub async fn harvest_key(
    source: &dyn StatsSource,
    spec: &KeySpec,
    global_exclusions: &BTreeSet<String>,
    settings: &HarvestSettings,
    predicate: &dyn ValuePredicate,
) -> Result<KeyHarvest, HarvestError> {
    let mut selector = CandidateSelector::new(spec, global_exclusions, predicate);
    engine_debug!(
        "   Excluded values for {}: {:?}",
        spec.key,
        selector.universe().values()
    );

    let pager = Pager::new(spec.key.clone(), settings.page_size, spec.min_count)
        .with_max_pages(settings.max_pages);
    let mut fetcher = PageFetcher::new(source, pager);

    let stop_reason = loop {
        let page = fetcher
            .next_page()
            .await
            .map_err(|source| HarvestError::ServiceUnavailable {
                key: spec.key.clone(),
                source,
            })?;
        match page {
            Page::Records(records) => selector.extend(records),
            Page::Finished(reason) => break reason,
        }
    };

    match stop_reason {
        StopReason::PageLimit { pages } => engine_warn!(
            "Stopped after page limit of {} for key {}; list may be incomplete",
            pages,
            spec.key
        ),
        reason => engine_debug!("   Stopped paging for {}: {:?}", spec.key, reason),
    }

    Ok(KeyHarvest {
        selection: selector.finish(),
        stop_reason,
        pages_fetched: fetcher.pages_fetched(),
    })
}
