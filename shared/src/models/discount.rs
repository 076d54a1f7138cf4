//! Discount vocabulary and application arithmetic

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// Compute the discount amount for a subtotal.
///
/// Percentage discounts are capped by `max_discount` when it is positive;
/// fixed discounts never exceed the subtotal. Result is never negative.
pub fn apply_discount(
    subtotal: Decimal,
    discount_type: DiscountType,
    value: Decimal,
    max_discount: Decimal,
) -> Decimal {
    let raw = match discount_type {
        DiscountType::Percentage => subtotal * value / Decimal::from(100),
        DiscountType::Fixed => value,
    };

    let capped = if max_discount > Decimal::ZERO {
        raw.min(max_discount)
    } else {
        raw
    };

    capped.clamp(Decimal::ZERO, subtotal)
}

/// Whether a discount can be applied at `now`.
///
/// Checks the active flag, the validity window, and the global usage limit
/// (a limit of zero means unlimited).
pub fn discount_is_applicable(
    is_active: bool,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    usage_limit: i32,
    usage_count: i32,
    subtotal: Decimal,
    min_purchase: Decimal,
    now: DateTime<Utc>,
) -> bool {
    if !is_active {
        return false;
    }
    if let Some(start) = start_date {
        if now < start {
            return false;
        }
    }
    if let Some(end) = end_date {
        if now > end {
            return false;
        }
    }
    if usage_limit > 0 && usage_count >= usage_limit {
        return false;
    }
    subtotal >= min_purchase
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_percentage_discount() {
        let amount = apply_discount(
            dec("50000"),
            DiscountType::Percentage,
            dec("10"),
            Decimal::ZERO,
        );
        assert_eq!(amount, dec("5000"));
    }

    #[test]
    fn test_percentage_discount_capped() {
        let amount = apply_discount(
            dec("100000"),
            DiscountType::Percentage,
            dec("20"),
            dec("15000"),
        );
        assert_eq!(amount, dec("15000"));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let amount = apply_discount(dec("4000"), DiscountType::Fixed, dec("10000"), Decimal::ZERO);
        assert_eq!(amount, dec("4000"));
    }

    #[test]
    fn test_applicability_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap();

        assert!(discount_is_applicable(
            true,
            Some(start),
            Some(end),
            0,
            0,
            dec("20000"),
            dec("10000"),
            now,
        ));
        // Expired
        let late = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        assert!(!discount_is_applicable(
            true,
            Some(start),
            Some(end),
            0,
            0,
            dec("20000"),
            dec("10000"),
            late,
        ));
        // Usage limit exhausted
        assert!(!discount_is_applicable(
            true,
            None,
            None,
            5,
            5,
            dec("20000"),
            Decimal::ZERO,
            now,
        ));
        // Below minimum purchase
        assert!(!discount_is_applicable(
            true,
            None,
            None,
            0,
            0,
            dec("5000"),
            dec("10000"),
            now,
        ));
    }
}
