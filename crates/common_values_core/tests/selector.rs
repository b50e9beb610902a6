use std::collections::BTreeSet;

use common_values_core::{
    CandidateSelector, EmptyCandidateList, FrequencyRecord, KeySpec, RejectionCounts, ValueShape,
    Verdict,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn records(items: &[(&str, u64)]) -> Vec<FrequencyRecord> {
    items
        .iter()
        .map(|(value, count)| FrequencyRecord::new(*value, *count))
        .collect()
}

#[test]
fn accepts_in_arrival_order() {
    init_logging();
    let shape = ValueShape::default();
    let spec = KeySpec::new("access", 50);
    let mut selector = CandidateSelector::new(&spec, &BTreeSet::new(), &shape);

    selector.extend(records(&[("yes", 120), ("no", 80)]));
    let selection = selector.finish();

    assert_eq!(selection.candidates, vec!["yes", "no"]);
    assert!(selection.found_exclusions.is_empty());
    assert!(selection.not_found.is_empty());
}

#[test]
fn global_exclusion_is_recorded_as_found() {
    init_logging();
    let shape = ValueShape::default();
    let spec = KeySpec::new("access", 50);
    let mut selector = CandidateSelector::new(&spec, &set(&["no"]), &shape);

    selector.extend(records(&[("yes", 120), ("no", 80)]));
    let selection = selector.finish();

    assert_eq!(selection.candidates, vec!["yes"]);
    assert_eq!(selection.found_exclusions, set(&["no"]));
    assert_eq!(selection.rejected.excluded, 1);
}

#[test]
fn multi_value_is_rejected_regardless_of_count() {
    init_logging();
    let shape = ValueShape::default();
    let spec = KeySpec::new("cuisine", 10);
    let mut selector = CandidateSelector::new(&spec, &BTreeSet::new(), &shape);

    assert_eq!(
        selector.offer(FrequencyRecord::new("a;b", 1_000_000)),
        Verdict::InvalidShape
    );
    assert_eq!(selector.offer(FrequencyRecord::new("  ", 500)), Verdict::InvalidShape);
    assert!(selector.candidates().is_empty());
}

#[test]
fn threshold_is_a_hard_floor_even_out_of_order() {
    init_logging();
    let shape = ValueShape::default();
    let spec = KeySpec::new("shop", 100);
    let mut selector = CandidateSelector::new(&spec, &BTreeSet::new(), &shape);

    selector.extend(records(&[("bakery", 150), ("kiosk", 99), ("butcher", 100)]));
    let selection = selector.finish();

    assert_eq!(selection.candidates, vec!["bakery", "butcher"]);
    assert_eq!(
        selection.rejected,
        RejectionCounts {
            below_threshold: 1,
            invalid_shape: 0,
            excluded: 0,
        }
    );
}

#[test]
fn shape_is_checked_before_exclusion() {
    init_logging();
    let shape = ValueShape::default();
    let spec = KeySpec::new("sport", 1).with_exclusions(["a;b"]);
    let mut selector = CandidateSelector::new(&spec, &BTreeSet::new(), &shape);

    assert_eq!(selector.offer(FrequencyRecord::new("a;b", 10)), Verdict::InvalidShape);
    let selection = selector.finish();
    assert!(selection.found_exclusions.is_empty());
    assert_eq!(selection.not_found, set(&["a;b"]));
}

#[test]
fn empty_selection_is_reported() {
    init_logging();
    let shape = ValueShape::default();
    let spec = KeySpec::new("ghost", 50);
    let selection = CandidateSelector::new(&spec, &BTreeSet::new(), &shape).finish();

    assert!(selection.is_empty());
    assert_eq!(
        selection.require_candidates(),
        Err(EmptyCandidateList {
            key: "ghost".to_string()
        })
    );
}

#[test]
fn unmet_exclusions_are_listed_as_not_found() {
    init_logging();
    let shape = ValueShape::default();
    let spec = KeySpec::new("amenity", 50).with_exclusions(["rare_value"]);
    let mut selector = CandidateSelector::new(&spec, &set(&["no"]), &shape);

    selector.extend(records(&[("parking", 300), ("no", 90)]));
    let selection = selector.finish();

    assert_eq!(selection.candidates, vec!["parking"]);
    assert_eq!(selection.found_exclusions, set(&["no"]));
    assert_eq!(selection.not_found, set(&["rare_value"]));
    assert_eq!(selection.require_candidates().map(|c| c.len()), Ok(1));
}

#[test]
fn injected_predicate_replaces_shape_rule() {
    init_logging();
    let no_digits = |value: &str| !value.chars().any(|c| c.is_ascii_digit());
    let spec = KeySpec::new("ref", 1);
    let mut selector = CandidateSelector::new(&spec, &BTreeSet::new(), &no_digits);

    selector.extend(records(&[("A1", 40), ("north", 30), ("a;b", 20)]));
    assert_eq!(selector.candidates(), ["north".to_string(), "a;b".to_string()]);
}
