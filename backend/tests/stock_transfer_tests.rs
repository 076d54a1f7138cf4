//! Stock transfer tests: endpoint validation and status gating

use proptest::prelude::*;
use uuid::Uuid;

use shared::models::{LocationKind, TransferStatus};
use shared::validation::validate_transfer_endpoints;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Warehouse-to-warehouse, warehouse-to-store, store-to-store and
    /// store-to-warehouse are all valid shapes
    #[test]
    fn test_all_endpoint_combinations() {
        let w1 = Uuid::new_v4();
        let w2 = Uuid::new_v4();
        let s1 = Uuid::new_v4();
        let s2 = Uuid::new_v4();

        let (from, to) = validate_transfer_endpoints(Some(w1), None, Some(w2), None).unwrap();
        assert_eq!(from.kind, LocationKind::Warehouse);
        assert_eq!(to.kind, LocationKind::Warehouse);

        let (from, to) = validate_transfer_endpoints(Some(w1), None, None, Some(s1)).unwrap();
        assert_eq!(from.kind, LocationKind::Warehouse);
        assert_eq!(to.kind, LocationKind::Store);

        let (from, to) = validate_transfer_endpoints(None, Some(s1), None, Some(s2)).unwrap();
        assert_eq!(from.kind, LocationKind::Store);
        assert_eq!(to.kind, LocationKind::Store);

        let (from, to) = validate_transfer_endpoints(None, Some(s1), Some(w1), None).unwrap();
        assert_eq!(from.kind, LocationKind::Store);
        assert_eq!(to.kind, LocationKind::Warehouse);
    }

    /// Ambiguous or missing endpoints are rejected
    #[test]
    fn test_invalid_endpoint_shapes() {
        let w = Uuid::new_v4();
        let s = Uuid::new_v4();

        // No source
        assert!(validate_transfer_endpoints(None, None, Some(w), None).is_err());
        // No destination
        assert!(validate_transfer_endpoints(Some(w), None, None, None).is_err());
        // Two sources
        assert!(validate_transfer_endpoints(Some(w), Some(s), Some(w), None).is_err());
        // Two destinations
        assert!(validate_transfer_endpoints(Some(w), None, Some(w), Some(s)).is_err());
    }

    /// Transfers to the same location are rejected
    #[test]
    fn test_same_location_rejected() {
        let w = Uuid::new_v4();
        let s = Uuid::new_v4();
        assert!(validate_transfer_endpoints(Some(w), None, Some(w), None).is_err());
        assert!(validate_transfer_endpoints(None, Some(s), None, Some(s)).is_err());
    }

    /// The same raw id is fine when the kinds differ: a store and a
    /// warehouse are distinct locations
    #[test]
    fn test_same_id_across_kinds_allowed() {
        let id = Uuid::new_v4();
        assert!(validate_transfer_endpoints(Some(id), None, None, Some(id)).is_ok());
    }

    /// Only pending transfers execute
    #[test]
    fn test_execution_gate() {
        assert!(TransferStatus::Pending.can_execute());
        assert!(!TransferStatus::InTransit.can_execute());
        assert!(!TransferStatus::Completed.can_execute());
        assert!(!TransferStatus::Cancelled.can_execute());
    }

    /// Status strings round-trip
    #[test]
    fn test_status_round_trip() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::InTransit,
            TransferStatus::Completed,
            TransferStatus::Cancelled,
        ] {
            assert_eq!(TransferStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TransferStatus::from_str("done"), None);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// For any endpoint shape, acceptance implies exactly one source and
    /// one destination and they differ
    #[test]
    fn prop_accepted_endpoints_are_unambiguous(
        fw in prop::bool::ANY,
        fs in prop::bool::ANY,
        tw in prop::bool::ANY,
        ts in prop::bool::ANY,
    ) {
        let id = |flag: bool| flag.then(Uuid::new_v4);
        let result = validate_transfer_endpoints(id(fw), id(fs), id(tw), id(ts));

        let one_source = fw ^ fs;
        let one_destination = tw ^ ts;

        if result.is_ok() {
            prop_assert!(one_source && one_destination);
            let (from, to) = result.unwrap();
            prop_assert!(from != to);
        } else {
            // With fresh ids per slot, rejection only happens on shape
            prop_assert!(!(one_source && one_destination));
        }
    }
}
