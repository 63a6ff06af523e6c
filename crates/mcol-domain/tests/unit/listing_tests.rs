//! Unit tests for the metric listing

use mcol_domain::MetricListing;

#[test]
fn test_listing_is_sorted_and_formatted() {
    let listing = MetricListing::new(
        vec![("b".to_string(), 2), ("a".to_string(), 1)],
        vec![("Alloc".to_string(), 0.5)],
    );

    assert_eq!(listing.len(), 3);
    assert_eq!(listing.counter_lines(), vec!["[a]: [1]", "[b]: [2]"]);
    assert_eq!(listing.gauge_lines(), vec!["[Alloc]: [0.500]"]);
    assert_eq!(listing.lines().first().map(String::as_str), Some("[Alloc]: [0.500]"));
}

#[test]
fn test_empty_listing() {
    let listing = MetricListing::default();
    assert!(listing.is_empty());
    assert!(listing.lines().is_empty());
}
