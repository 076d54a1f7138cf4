//! Stock movement engine tests
//!
//! Exercises the movement semantics against an in-memory model of the
//! balance tables and ledger:
//! - balances never go negative after a committed operation
//! - every committed mutation appends exactly one ledger entry
//! - a failed line leaves the whole business event unapplied
//! - find-or-create never duplicates a balance row

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{LocationKind, LocationRef, MovementKind};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Balance key: (product, variant, location)
type Key = (Uuid, Option<Uuid>, LocationKind, Uuid);

/// One ledger row in the model
#[derive(Debug, Clone, PartialEq)]
struct LedgerRow {
    key: Key,
    kind: MovementKind,
    quantity: Decimal,
    reference_id: Option<Uuid>,
}

/// In-memory mirror of the stock movement engine's semantics
#[derive(Debug, Default)]
struct StockModel {
    balances: HashMap<Key, Decimal>,
    ledger: Vec<LedgerRow>,
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Inbound(Decimal),
    Outbound(Decimal),
    SetQuantity(Decimal),
}

impl StockModel {
    /// Find-or-create the balance row, mirroring lazy creation at zero
    fn get_or_create(&mut self, key: Key) -> Decimal {
        *self.balances.entry(key).or_insert(Decimal::ZERO)
    }

    /// Apply one movement; on error nothing is recorded
    fn apply(&mut self, key: Key, op: Op, reference_id: Option<Uuid>) -> Result<Decimal, &'static str> {
        let old = self.get_or_create(key);

        let (kind, new, logged) = match op {
            Op::Inbound(q) => {
                if q <= Decimal::ZERO {
                    return Err("non-positive magnitude");
                }
                (MovementKind::In, old + q, q)
            }
            Op::Outbound(q) => {
                if q <= Decimal::ZERO {
                    return Err("non-positive magnitude");
                }
                if q > old {
                    return Err("insufficient stock");
                }
                (MovementKind::Out, old - q, q)
            }
            Op::SetQuantity(target) => {
                if target < Decimal::ZERO {
                    return Err("negative target");
                }
                (MovementKind::Adjustment, target, target - old)
            }
        };

        self.balances.insert(key, new);
        self.ledger.push(LedgerRow {
            key,
            kind,
            quantity: logged,
            reference_id,
        });
        Ok(new)
    }

    /// Apply a multi-line business event atomically: all lines or none
    fn apply_event(
        &mut self,
        lines: &[(Key, Op)],
        reference_id: Option<Uuid>,
    ) -> Result<(), &'static str> {
        let snapshot_balances = self.balances.clone();
        let snapshot_len = self.ledger.len();

        for (key, op) in lines {
            if let Err(e) = self.apply(*key, *op, reference_id) {
                self.balances = snapshot_balances;
                self.ledger.truncate(snapshot_len);
                return Err(e);
            }
        }
        Ok(())
    }
}

fn store_key(product: Uuid, store: Uuid) -> Key {
    (product, None, LocationKind::Store, store)
}

fn warehouse_key(product: Uuid, warehouse: Uuid) -> Key {
    (product, None, LocationKind::Warehouse, warehouse)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Sale of 20 against a balance of 50 leaves 30 and one `out` row
    #[test]
    fn test_sale_reduces_balance_and_appends_ledger() {
        let mut model = StockModel::default();
        let key = store_key(Uuid::new_v4(), Uuid::new_v4());
        let sale_id = Uuid::new_v4();

        model.balances.insert(key, dec("50"));
        model
            .apply(key, Op::Outbound(dec("20")), Some(sale_id))
            .unwrap();

        assert_eq!(model.balances[&key], dec("30"));
        assert_eq!(model.ledger.len(), 1);
        assert_eq!(model.ledger[0].kind, MovementKind::Out);
        assert_eq!(model.ledger[0].quantity, dec("20"));
        assert_eq!(model.ledger[0].reference_id, Some(sale_id));
    }

    /// A sale exceeding the balance is rejected before any mutation
    #[test]
    fn test_insufficient_stock_leaves_state_untouched() {
        let mut model = StockModel::default();
        let key = store_key(Uuid::new_v4(), Uuid::new_v4());

        model.balances.insert(key, dec("50"));
        let result = model.apply(key, Op::Outbound(dec("60")), None);

        assert!(result.is_err());
        assert_eq!(model.balances[&key], dec("50"));
        assert!(model.ledger.is_empty());
    }

    /// First receipt lazily creates the balance at zero, then applies
    #[test]
    fn test_first_receipt_creates_balance() {
        let mut model = StockModel::default();
        let key = warehouse_key(Uuid::new_v4(), Uuid::new_v4());
        let po_id = Uuid::new_v4();

        assert!(!model.balances.contains_key(&key));
        model
            .apply(key, Op::Inbound(dec("100")), Some(po_id))
            .unwrap();

        assert_eq!(model.balances[&key], dec("100"));
        assert_eq!(model.ledger.len(), 1);
        assert_eq!(model.ledger[0].kind, MovementKind::In);
        assert_eq!(model.ledger[0].quantity, dec("100"));
    }

    /// Adjustment from 100 down to 80 logs a signed delta of -20
    #[test]
    fn test_adjustment_logs_signed_delta() {
        let mut model = StockModel::default();
        let key = warehouse_key(Uuid::new_v4(), Uuid::new_v4());

        model.balances.insert(key, dec("100"));
        model.apply(key, Op::SetQuantity(dec("80")), None).unwrap();

        assert_eq!(model.balances[&key], dec("80"));
        assert_eq!(model.ledger[0].kind, MovementKind::Adjustment);
        assert_eq!(model.ledger[0].quantity, dec("-20"));
    }

    /// Adjustments may not target a negative quantity
    #[test]
    fn test_adjustment_rejects_negative_target() {
        let mut model = StockModel::default();
        let key = warehouse_key(Uuid::new_v4(), Uuid::new_v4());

        assert!(model.apply(key, Op::SetQuantity(dec("-1")), None).is_err());
        assert!(model.ledger.is_empty());
    }

    /// Zero and negative magnitudes are invalid for in/out movements
    #[test]
    fn test_non_positive_magnitudes_rejected() {
        let mut model = StockModel::default();
        let key = store_key(Uuid::new_v4(), Uuid::new_v4());
        model.balances.insert(key, dec("10"));

        assert!(model.apply(key, Op::Inbound(Decimal::ZERO), None).is_err());
        assert!(model.apply(key, Op::Outbound(dec("-5")), None).is_err());
        assert_eq!(model.balances[&key], dec("10"));
    }

    /// get_or_create is idempotent: one row per key, ever
    #[test]
    fn test_lazy_creation_is_idempotent() {
        let mut model = StockModel::default();
        let key = store_key(Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(model.get_or_create(key), Decimal::ZERO);
        model.apply(key, Op::Inbound(dec("5")), None).unwrap();
        assert_eq!(model.get_or_create(key), dec("5"));
        assert_eq!(model.balances.len(), 1);
    }

    /// A three-line sale where line two is short rolls back all lines
    #[test]
    fn test_multi_line_event_is_atomic() {
        let mut model = StockModel::default();
        let store = Uuid::new_v4();
        let keys: Vec<Key> = (0..3).map(|_| store_key(Uuid::new_v4(), store)).collect();

        model.balances.insert(keys[0], dec("10"));
        model.balances.insert(keys[1], dec("1"));
        model.balances.insert(keys[2], dec("10"));

        let sale_id = Uuid::new_v4();
        let result = model.apply_event(
            &[
                (keys[0], Op::Outbound(dec("5"))),
                (keys[1], Op::Outbound(dec("2"))),
                (keys[2], Op::Outbound(dec("5"))),
            ],
            Some(sale_id),
        );

        assert!(result.is_err());
        assert_eq!(model.balances[&keys[0]], dec("10"));
        assert_eq!(model.balances[&keys[1]], dec("1"));
        assert_eq!(model.balances[&keys[2]], dec("10"));
        assert!(model.ledger.is_empty());
    }

    /// Transfer of Q moves exactly Q and writes two rows with one reference
    #[test]
    fn test_transfer_symmetry() {
        let mut model = StockModel::default();
        let product = Uuid::new_v4();
        let source = warehouse_key(product, Uuid::new_v4());
        let destination = store_key(product, Uuid::new_v4());
        let transfer_id = Uuid::new_v4();

        model.balances.insert(source, dec("40"));
        model
            .apply_event(
                &[
                    (source, Op::Outbound(dec("15"))),
                    (destination, Op::Inbound(dec("15"))),
                ],
                Some(transfer_id),
            )
            .unwrap();

        assert_eq!(model.balances[&source], dec("25"));
        assert_eq!(model.balances[&destination], dec("15"));
        assert_eq!(model.ledger.len(), 2);
        assert!(model
            .ledger
            .iter()
            .all(|row| row.reference_id == Some(transfer_id)));
        assert_eq!(model.ledger[0].kind, MovementKind::Out);
        assert_eq!(model.ledger[1].kind, MovementKind::In);
        assert_eq!(model.ledger[0].quantity, model.ledger[1].quantity);
    }

    /// An insufficient source aborts both legs of the transfer
    #[test]
    fn test_transfer_insufficient_source_rolls_back_both_legs() {
        let mut model = StockModel::default();
        let product = Uuid::new_v4();
        let source = warehouse_key(product, Uuid::new_v4());
        let destination = warehouse_key(product, Uuid::new_v4());

        model.balances.insert(source, dec("5"));
        let result = model.apply_event(
            &[
                (source, Op::Outbound(dec("10"))),
                (destination, Op::Inbound(dec("10"))),
            ],
            Some(Uuid::new_v4()),
        );

        assert!(result.is_err());
        assert_eq!(model.balances[&source], dec("5"));
        assert_eq!(model.balances.get(&destination), None);
        assert!(model.ledger.is_empty());
    }

    /// Location kinds address separate balance tables
    #[test]
    fn test_same_ids_different_kind_are_distinct_balances() {
        let mut model = StockModel::default();
        let product = Uuid::new_v4();
        let location = Uuid::new_v4();

        model
            .apply(warehouse_key(product, location), Op::Inbound(dec("7")), None)
            .unwrap();
        model
            .apply(store_key(product, location), Op::Inbound(dec("3")), None)
            .unwrap();

        assert_eq!(model.balances[&warehouse_key(product, location)], dec("7"));
        assert_eq!(model.balances[&store_key(product, location)], dec("3"));
    }

    /// LocationRef constructors tag the kind correctly
    #[test]
    fn test_location_ref_constructors() {
        let id = Uuid::new_v4();
        assert_eq!(LocationRef::warehouse(id).kind, LocationKind::Warehouse);
        assert_eq!(LocationRef::store(id).kind, LocationKind::Store);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..1000i64).prop_map(|q| Op::Inbound(Decimal::from(q))),
        (1..1000i64).prop_map(|q| Op::Outbound(Decimal::from(q))),
        (0..1000i64).prop_map(|q| Op::SetQuantity(Decimal::from(q))),
    ]
}

proptest! {
    /// No sequence of operations drives a balance negative
    #[test]
    fn prop_balance_never_negative(ops in prop::collection::vec(arb_op(), 1..50)) {
        let mut model = StockModel::default();
        let key = store_key(Uuid::new_v4(), Uuid::new_v4());

        for op in ops {
            let _ = model.apply(key, op, None);
            prop_assert!(model.balances[&key] >= Decimal::ZERO);
        }
    }

    /// Every committed mutation has exactly one ledger row, and replaying
    /// the ledger reproduces the final balance
    #[test]
    fn prop_ledger_replays_to_balance(ops in prop::collection::vec(arb_op(), 1..50)) {
        let mut model = StockModel::default();
        let key = warehouse_key(Uuid::new_v4(), Uuid::new_v4());

        let mut committed = 0usize;
        for op in ops {
            if model.apply(key, op, None).is_ok() {
                committed += 1;
            }
        }
        prop_assert_eq!(model.ledger.len(), committed);

        let replayed = model.ledger.iter().fold(Decimal::ZERO, |acc, row| {
            match row.kind {
                MovementKind::In => acc + row.quantity,
                MovementKind::Out => acc - row.quantity,
                MovementKind::Adjustment => acc + row.quantity,
            }
        });
        prop_assert_eq!(replayed, model.balances[&key]);
    }

    /// in/out rows always carry a positive magnitude; only adjustments
    /// may be signed
    #[test]
    fn prop_sign_convention(ops in prop::collection::vec(arb_op(), 1..50)) {
        let mut model = StockModel::default();
        let key = store_key(Uuid::new_v4(), Uuid::new_v4());

        for op in ops {
            let _ = model.apply(key, op, None);
        }

        for row in &model.ledger {
            match row.kind {
                MovementKind::In | MovementKind::Out => {
                    prop_assert!(row.quantity > Decimal::ZERO)
                }
                MovementKind::Adjustment => {}
            }
        }
    }

    /// Transfers preserve total stock across locations
    #[test]
    fn prop_transfer_preserves_total(
        initial in 1..1000i64,
        transfer in 1..1000i64,
    ) {
        let mut model = StockModel::default();
        let product = Uuid::new_v4();
        let a = warehouse_key(product, Uuid::new_v4());
        let b = store_key(product, Uuid::new_v4());

        let initial = Decimal::from(initial);
        let transfer = Decimal::from(transfer);
        model.balances.insert(a, initial);

        let before: Decimal = model.balances.values().copied().sum();
        let _ = model.apply_event(
            &[(a, Op::Outbound(transfer)), (b, Op::Inbound(transfer))],
            Some(Uuid::new_v4()),
        );
        let after: Decimal = model.balances.values().copied().sum();

        prop_assert_eq!(before, after);
    }
}
