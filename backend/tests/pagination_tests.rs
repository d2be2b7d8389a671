//! Pagination and list filter tests

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    GradingAttributes, InventoryFilter, InventoryItem, InventoryStatus, Page, Pagination,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use uuid::Uuid;

fn item(gem_name: &str, weight: Decimal, color: Option<&str>, status: InventoryStatus) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        gem_name: gem_name.to_string(),
        weight,
        grading: GradingAttributes {
            color: color.map(str::to_string),
            ..Default::default()
        },
        purchase_price: Decimal::from(100),
        current_value: Decimal::from(100),
        quantity: 1,
        description: None,
        status,
        purchase_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Slice a filtered list the way the list endpoint pages through it
fn page_of(items: &[InventoryItem], filter: &InventoryFilter, pagination: Pagination) -> Page<Uuid> {
    let matching: Vec<Uuid> = items.iter().filter(|i| filter.matches(i)).map(|i| i.id).collect();
    let total = matching.len() as i64;
    let page = matching
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect();
    Page::new(page, total, pagination)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::new(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_page_beyond_end_is_empty_with_total() {
        let items: Vec<_> = (0..5)
            .map(|_| item("Ruby", Decimal::ONE, None, InventoryStatus::Available))
            .collect();
        let page = page_of(&items, &InventoryFilter::default(), Pagination::new(Some(3), Some(2)));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 5);

        let page = page_of(&items, &InventoryFilter::default(), Pagination::new(Some(9), Some(2)));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_combined_filters() {
        let items = vec![
            item("Blue Sapphire", Decimal::new(25, 1), Some("Cornflower Blue"), InventoryStatus::Available),
            item("Yellow Sapphire", Decimal::new(30, 1), Some("Canary"), InventoryStatus::Available),
            item("Blue Sapphire", Decimal::new(50, 1), Some("Blue"), InventoryStatus::Sold),
            item("Ruby", Decimal::new(20, 1), Some("Pigeon Blood"), InventoryStatus::Available),
        ];
        let filter = InventoryFilter {
            gem_name: Some("sapphire".to_string()),
            color: Some("blue".to_string()),
            weight_min: Some(Decimal::new(20, 1)),
            weight_max: Some(Decimal::new(40, 1)),
            status: Some(InventoryStatus::Available),
        };

        let page = page_of(&items, &filter, Pagination::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.items, vec![items[0].id]);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = InventoryStatus> {
        prop_oneof![
            Just(InventoryStatus::Available),
            Just(InventoryStatus::Sold),
            Just(InventoryStatus::Reserved),
        ]
    }

    fn item_strategy() -> impl Strategy<Value = InventoryItem> {
        (
            prop_oneof![Just("Ruby"), Just("Blue Sapphire"), Just("Spinel"), Just("Emerald")],
            1i64..=1000i64,
            status_strategy(),
        )
            .prop_map(|(name, w, status)| item(name, Decimal::new(w, 2), None, status))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Limits are always clamped into range and page is at least 1
        #[test]
        fn prop_pagination_clamped(page in prop::option::of(0u32..1000), limit in prop::option::of(0u32..1000)) {
            let p = Pagination::new(page, limit);
            prop_assert!(p.page >= 1);
            prop_assert!(p.limit >= 1 && p.limit <= MAX_PAGE_LIMIT);
            prop_assert_eq!(p.offset(), i64::from(p.page - 1) * i64::from(p.limit));
        }

        /// `total` does not depend on page or limit, and walking every page
        /// yields each matching item exactly once
        #[test]
        fn prop_pages_cover_matches_once(
            items in prop::collection::vec(item_strategy(), 0..40),
            status in prop::option::of(status_strategy()),
            limit in 1u32..15
        ) {
            let filter = InventoryFilter { status, ..Default::default() };
            let expected: Vec<Uuid> = items.iter().filter(|i| filter.matches(i)).map(|i| i.id).collect();

            let page_count = Pagination::new(Some(1), Some(limit)).total_pages(expected.len() as i64);

            let mut seen = Vec::new();
            for page in 1..=page_count.max(1) {
                let current = page_of(&items, &filter, Pagination::new(Some(page), Some(limit)));
                prop_assert_eq!(current.total, expected.len() as i64);
                prop_assert!(current.items.len() <= limit as usize);
                seen.extend(current.items);
            }
            prop_assert_eq!(seen, expected);
        }

        /// Every item passes an empty filter
        #[test]
        fn prop_empty_filter_matches_all(items in prop::collection::vec(item_strategy(), 0..20)) {
            let filter = InventoryFilter::default();
            prop_assert!(items.iter().all(|i| filter.matches(i)));
        }
    }
}
