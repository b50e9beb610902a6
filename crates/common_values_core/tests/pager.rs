use common_values_core::{FrequencyRecord, Page, PageRequest, Pager, PagerPhase, StopReason};

fn page(records: &[(&str, u64)]) -> Vec<FrequencyRecord> {
    records
        .iter()
        .map(|(value, count)| FrequencyRecord::new(*value, *count))
        .collect()
}

#[test]
fn starts_at_page_one() {
    let pager = Pager::new("amenity", 2, 50);
    assert_eq!(
        pager.next_request(),
        Some(PageRequest {
            key: "amenity".to_string(),
            page: 1,
            page_size: 2,
        })
    );
    assert_eq!(pager.phase(), PagerPhase::Fetching { page: 1 });
    assert_eq!(pager.pages_fetched(), 0);
}

#[test]
fn stops_when_page_opens_below_threshold() {
    let mut pager = Pager::new("amenity", 2, 50);

    let first = pager.admit(page(&[("yes", 120), ("no", 80)]));
    assert_eq!(first, Page::Records(page(&[("yes", 120), ("no", 80)])));
    assert_eq!(pager.next_request().map(|r| r.page), Some(2));

    let second = pager.admit(page(&[("maybe", 40)]));
    assert_eq!(
        second,
        Page::Finished(StopReason::BelowThreshold { page: 2, count: 40 })
    );
    assert!(pager.is_done());
    assert_eq!(
        pager.stop_reason(),
        Some(StopReason::BelowThreshold { page: 2, count: 40 })
    );
    assert_eq!(pager.next_request(), None);
    assert_eq!(pager.pages_fetched(), 2);
}

#[test]
fn stops_on_empty_page() {
    let mut pager = Pager::new("shop", 100, 1);
    assert_eq!(
        pager.admit(Vec::new()),
        Page::Finished(StopReason::EmptyPage { page: 1 })
    );
    assert_eq!(pager.stop_reason(), Some(StopReason::EmptyPage { page: 1 }));
}

#[test]
fn page_with_mixed_counts_is_yielded_whole() {
    // Only the leading record decides termination; trailing sub-threshold
    // records are left for the selector to drop.
    let mut pager = Pager::new("shop", 3, 50);
    let records = pager.admit(page(&[("bakery", 60), ("kiosk", 55), ("florist", 10)]));
    assert!(matches!(records, Page::Records(ref r) if r.len() == 3));
    assert!(!pager.is_done());
}

#[test]
fn page_limit_stops_after_last_allowed_page() {
    let mut pager = Pager::new("highway", 1, 1).with_max_pages(Some(2));
    assert!(matches!(pager.admit(page(&[("residential", 900)])), Page::Records(_)));
    assert!(matches!(pager.admit(page(&[("service", 800)])), Page::Records(_)));
    assert_eq!(pager.stop_reason(), Some(StopReason::PageLimit { pages: 2 }));
    assert_eq!(pager.next_request(), None);
}

#[test]
fn stopped_pager_ignores_further_pages() {
    let mut pager = Pager::new("highway", 1, 10);
    pager.admit(Vec::new());
    assert_eq!(
        pager.admit(page(&[("primary", 500)])),
        Page::Finished(StopReason::EmptyPage { page: 1 })
    );
    assert_eq!(pager.pages_fetched(), 1);
    assert_eq!(pager.stop_reason(), Some(StopReason::EmptyPage { page: 1 }));
}
