//! Inventory tests: adjustment validation, movement vocabulary, and
//! threshold reporting logic

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{LocationKind, MovementKind, ReferenceKind};
use shared::types::{PaginatedResponse, Pagination};
use shared::validation::{validate_adjustment, validate_movement_magnitude};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Adjustments need a non-negative target and a reason
    #[test]
    fn test_adjustment_validation() {
        assert!(validate_adjustment(dec("0"), "stock opname").is_ok());
        assert!(validate_adjustment(dec("12.5"), "damage").is_ok());
        assert!(validate_adjustment(dec("-0.1"), "damage").is_err());
        assert!(validate_adjustment(dec("10"), "").is_err());
        assert!(validate_adjustment(dec("10"), "  \t").is_err());
    }

    /// Movement magnitudes are strictly positive
    #[test]
    fn test_magnitude_validation() {
        assert!(validate_movement_magnitude(dec("0.01")).is_ok());
        assert!(validate_movement_magnitude(Decimal::ZERO).is_err());
        assert!(validate_movement_magnitude(dec("-1")).is_err());
    }

    /// Vocabulary strings match the persisted column values
    #[test]
    fn test_persisted_vocabulary() {
        assert_eq!(LocationKind::Warehouse.as_str(), "warehouse");
        assert_eq!(LocationKind::Store.as_str(), "store");
        assert_eq!(MovementKind::In.as_str(), "in");
        assert_eq!(MovementKind::Out.as_str(), "out");
        assert_eq!(MovementKind::Adjustment.as_str(), "adjustment");
        assert_eq!(ReferenceKind::Sale.as_str(), "sale");
        assert_eq!(ReferenceKind::Purchase.as_str(), "purchase");
        assert_eq!(ReferenceKind::Transfer.as_str(), "transfer");
        assert_eq!(ReferenceKind::Adjustment.as_str(), "adjustment");
    }

    /// Low-stock predicate: enabled threshold and quantity at or below it
    #[test]
    fn test_low_stock_predicate() {
        let is_low = |quantity: Decimal, min_stock: Decimal| {
            min_stock > Decimal::ZERO && quantity <= min_stock
        };

        assert!(is_low(dec("5"), dec("10")));
        assert!(is_low(dec("10"), dec("10")));
        assert!(!is_low(dec("11"), dec("10")));
        // A zero threshold disables the alert entirely
        assert!(!is_low(dec("0"), dec("0")));
    }

    /// Pagination windows compute correct offsets
    #[test]
    fn test_pagination_window() {
        let page = Pagination {
            page: 4,
            per_page: 25,
        };
        assert_eq!(page.offset(), 75);
        assert_eq!(page.limit(), 25);
    }

    /// Paginated responses report total page counts
    #[test]
    fn test_paginated_response_meta() {
        let response = PaginatedResponse::new(
            vec![1, 2, 3],
            Pagination {
                page: 1,
                per_page: 3,
            },
            7,
        );
        assert_eq!(response.pagination.total, 7);
        assert_eq!(response.pagination.total_pages, 3);
        assert_eq!(response.data.len(), 3);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// normalized() always yields a usable window
    #[test]
    fn prop_pagination_normalized(page in 0u32..10_000, per_page in 0u32..10_000) {
        let normalized = Pagination { page, per_page }.normalized();
        prop_assert!(normalized.page >= 1);
        prop_assert!((1..=100).contains(&normalized.per_page));
        prop_assert!(normalized.offset() >= 0);
    }

    /// The adjustment delta recorded in the ledger reconstructs the target
    #[test]
    fn prop_adjustment_delta_reconstructs_target(old in 0..100_000i64, target in 0..100_000i64) {
        let old = Decimal::from(old);
        let target = Decimal::from(target);
        let delta = target - old;
        prop_assert_eq!(old + delta, target);
    }
}
