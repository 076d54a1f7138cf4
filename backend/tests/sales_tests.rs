//! Sales checkout tests: totals, change, loyalty, and discount math

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{
    apply_discount, compute_sale_totals, discount_is_applicable, loyalty_points_earned,
    DiscountType, PaymentMethod, SaleLine, SaleStatus,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Line totals subtract the per-line discount
    #[test]
    fn test_line_total() {
        let line = SaleLine {
            quantity: dec("2"),
            unit_price: dec("7500"),
            discount_amount: dec("1000"),
        };
        assert_eq!(line.total_price(), dec("14000"));
    }

    /// subtotal + tax - discount = total; overpayment becomes change
    #[test]
    fn test_checkout_totals() {
        let lines = vec![
            SaleLine {
                quantity: dec("1"),
                unit_price: dec("25000"),
                discount_amount: Decimal::ZERO,
            },
            SaleLine {
                quantity: dec("3"),
                unit_price: dec("5000"),
                discount_amount: Decimal::ZERO,
            },
        ];
        let totals = compute_sale_totals(&lines, dec("4000"), dec("2000"), &[dec("50000")]);

        assert_eq!(totals.subtotal, dec("40000"));
        assert_eq!(totals.total_amount, dec("42000"));
        assert_eq!(totals.paid_amount, dec("50000"));
        assert_eq!(totals.change_amount, dec("8000"));
    }

    /// Split payments are summed before computing change
    #[test]
    fn test_split_payment() {
        let lines = vec![SaleLine {
            quantity: dec("1"),
            unit_price: dec("30000"),
            discount_amount: Decimal::ZERO,
        }];
        let totals = compute_sale_totals(
            &lines,
            Decimal::ZERO,
            Decimal::ZERO,
            &[dec("20000"), dec("15000")],
        );
        assert_eq!(totals.paid_amount, dec("35000"));
        assert_eq!(totals.change_amount, dec("5000"));
    }

    /// Change never goes negative on underpayment
    #[test]
    fn test_underpayment_zero_change() {
        let lines = vec![SaleLine {
            quantity: dec("1"),
            unit_price: dec("10000"),
            discount_amount: Decimal::ZERO,
        }];
        let totals = compute_sale_totals(&lines, Decimal::ZERO, Decimal::ZERO, &[dec("8000")]);
        assert_eq!(totals.change_amount, Decimal::ZERO);
    }

    /// One loyalty point per full earn threshold of spend
    #[test]
    fn test_loyalty_points() {
        let threshold = dec("10000");
        assert_eq!(loyalty_points_earned(dec("9999"), threshold), 0);
        assert_eq!(loyalty_points_earned(dec("10000"), threshold), 1);
        assert_eq!(loyalty_points_earned(dec("35000"), threshold), 3);
    }

    /// Percentage discounts cap at max_discount; fixed discounts cap at
    /// the subtotal
    #[test]
    fn test_discount_application() {
        assert_eq!(
            apply_discount(dec("80000"), DiscountType::Percentage, dec("25"), dec("15000")),
            dec("15000")
        );
        assert_eq!(
            apply_discount(dec("80000"), DiscountType::Percentage, dec("10"), Decimal::ZERO),
            dec("8000")
        );
        assert_eq!(
            apply_discount(dec("3000"), DiscountType::Fixed, dec("5000"), Decimal::ZERO),
            dec("3000")
        );
    }

    /// Discount applicability: window, usage limit, minimum purchase
    #[test]
    fn test_discount_applicability() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        // Inactive discount never applies
        assert!(!discount_is_applicable(
            false, None, None, 0, 0, dec("50000"), Decimal::ZERO, now
        ));
        // Before the window opens
        let start = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        assert!(!discount_is_applicable(
            true,
            Some(start),
            None,
            0,
            0,
            dec("50000"),
            Decimal::ZERO,
            now
        ));
        // Exhausted usage limit
        assert!(!discount_is_applicable(
            true, None, None, 3, 3, dec("50000"), Decimal::ZERO, now
        ));
        // All conditions met
        assert!(discount_is_applicable(
            true, None, None, 3, 2, dec("50000"), dec("25000"), now
        ));
    }

    /// Only draft sales may be edited
    #[test]
    fn test_sale_status_vocabulary() {
        assert_eq!(SaleStatus::from_str("draft"), Some(SaleStatus::Draft));
        assert_eq!(
            SaleStatus::from_str("completed"),
            Some(SaleStatus::Completed)
        );
        assert_eq!(SaleStatus::from_str("void"), None);
    }

    /// Payment method strings round-trip
    #[test]
    fn test_payment_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::DigitalWallet,
            PaymentMethod::Credit,
        ] {
            assert_eq!(PaymentMethod::from_str(method.as_str()), Some(method));
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn arb_line() -> impl Strategy<Value = SaleLine> {
    ((1..100i64), (100..100_000i64)).prop_map(|(quantity, price)| SaleLine {
        quantity: Decimal::from(quantity),
        unit_price: Decimal::from(price),
        discount_amount: Decimal::ZERO,
    })
}

proptest! {
    /// Totals identity: total = subtotal + tax - discount
    #[test]
    fn prop_totals_identity(
        lines in prop::collection::vec(arb_line(), 1..10),
        tax in 0..10_000i64,
        discount in 0..5_000i64,
        paid in 0..10_000_000i64,
    ) {
        let tax = Decimal::from(tax);
        let discount = Decimal::from(discount);
        let paid = Decimal::from(paid);

        let totals = compute_sale_totals(&lines, tax, discount, &[paid]);

        let expected_subtotal: Decimal = lines.iter().map(|l| l.quantity * l.unit_price).sum();
        prop_assert_eq!(totals.subtotal, expected_subtotal);
        prop_assert_eq!(totals.total_amount, totals.subtotal + tax - discount);
        prop_assert!(totals.change_amount >= Decimal::ZERO);
        // Change is only due when payment covers the total
        if totals.change_amount > Decimal::ZERO {
            prop_assert_eq!(totals.change_amount, paid - totals.total_amount);
        }
    }

    /// A discount never exceeds the subtotal and is never negative
    #[test]
    fn prop_discount_bounded(
        subtotal in 0..10_000_000i64,
        value in 0..200i64,
        max in 0..100_000i64,
    ) {
        let subtotal = Decimal::from(subtotal);
        let amount = apply_discount(
            subtotal,
            DiscountType::Percentage,
            Decimal::from(value),
            Decimal::from(max),
        );
        prop_assert!(amount >= Decimal::ZERO);
        prop_assert!(amount <= subtotal);
    }

    /// Loyalty points scale linearly with the threshold
    #[test]
    fn prop_loyalty_points_floor(total in 0..10_000_000i64, threshold in 1..100_000i64) {
        let total = Decimal::from(total);
        let threshold = Decimal::from(threshold);
        let points = loyalty_points_earned(total, threshold);

        let lower = Decimal::from(points) * threshold;
        let upper = Decimal::from(points + 1) * threshold;
        prop_assert!(lower <= total);
        prop_assert!(total < upper);
    }
}
