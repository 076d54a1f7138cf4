//! Validation utilities for the Titik Kasir POS platform

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::LocationRef;

/// Validate the magnitude of an `in`/`out` stock movement.
pub fn validate_movement_magnitude(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Movement quantity must be positive");
    }
    Ok(())
}

/// Validate a manual adjustment request.
///
/// The target is an absolute on-hand quantity and may not be negative;
/// the operator must supply a non-empty reason.
pub fn validate_adjustment(target: Decimal, reason: &str) -> Result<(), &'static str> {
    if target < Decimal::ZERO {
        return Err("Adjusted quantity cannot be negative");
    }
    if reason.trim().is_empty() {
        return Err("Adjustment reason is required");
    }
    Ok(())
}

/// Resolve a transfer's endpoint fields into a (source, destination) pair.
///
/// Exactly one source and one destination must be given, and they cannot
/// be the same location. Warehouse-to-store and store-to-warehouse moves
/// are allowed.
pub fn validate_transfer_endpoints(
    from_warehouse_id: Option<Uuid>,
    from_store_id: Option<Uuid>,
    to_warehouse_id: Option<Uuid>,
    to_store_id: Option<Uuid>,
) -> Result<(LocationRef, LocationRef), &'static str> {
    let from = match (from_warehouse_id, from_store_id) {
        (Some(id), None) => LocationRef::warehouse(id),
        (None, Some(id)) => LocationRef::store(id),
        _ => return Err("Must specify exactly one source location"),
    };

    let to = match (to_warehouse_id, to_store_id) {
        (Some(id), None) => LocationRef::warehouse(id),
        (None, Some(id)) => LocationRef::store(id),
        _ => return Err("Must specify exactly one destination location"),
    };

    if from == to {
        return Err("Cannot transfer to the same location");
    }

    Ok((from, to))
}

/// Validate a product SKU: 2-50 characters, alphanumeric with `-`/`_`.
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 2 || sku.len() > 50 {
        return Err("SKU must be 2-50 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("SKU may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_movement_magnitude() {
        assert!(validate_movement_magnitude(dec("0.5")).is_ok());
        assert!(validate_movement_magnitude(Decimal::ZERO).is_err());
        assert!(validate_movement_magnitude(dec("-3")).is_err());
    }

    #[test]
    fn test_adjustment_requires_reason() {
        assert!(validate_adjustment(dec("10"), "stock opname").is_ok());
        assert!(validate_adjustment(dec("10"), "   ").is_err());
        assert!(validate_adjustment(dec("-1"), "damage").is_err());
    }

    #[test]
    fn test_transfer_endpoints_exactly_one_each() {
        let w1 = Uuid::new_v4();
        let w2 = Uuid::new_v4();
        let s1 = Uuid::new_v4();

        assert!(validate_transfer_endpoints(Some(w1), None, Some(w2), None).is_ok());
        assert!(validate_transfer_endpoints(Some(w1), None, None, Some(s1)).is_ok());
        // Two sources
        assert!(validate_transfer_endpoints(Some(w1), Some(s1), Some(w2), None).is_err());
        // No destination
        assert!(validate_transfer_endpoints(Some(w1), None, None, None).is_err());
        // Same location
        assert!(validate_transfer_endpoints(Some(w1), None, Some(w1), None).is_err());
    }

    #[test]
    fn test_same_id_different_kind_is_allowed() {
        let id = Uuid::new_v4();
        assert!(validate_transfer_endpoints(Some(id), None, None, Some(id)).is_ok());
    }

    #[test]
    fn test_sku() {
        assert!(validate_sku("SKU-001_A").is_ok());
        assert!(validate_sku("x").is_err());
        assert!(validate_sku("has space").is_err());
    }
}
