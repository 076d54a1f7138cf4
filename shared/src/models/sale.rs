//! Sale status vocabulary and checkout arithmetic

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Draft,
    Completed,
    Cancelled,
    Refunded,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Draft => "draft",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(SaleStatus::Draft),
            "completed" => Some(SaleStatus::Completed),
            "cancelled" => Some(SaleStatus::Cancelled),
            "refunded" => Some(SaleStatus::Refunded),
            _ => None,
        }
    }
}

/// Payment settlement state of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Partial,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// Tender types accepted at the register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    DigitalWallet,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::DigitalWallet => "digital_wallet",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "digital_wallet" => Some(PaymentMethod::DigitalWallet),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }
}

/// One line of a checkout, before persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_amount: Decimal,
}

impl SaleLine {
    /// (quantity * unit_price) - discount_amount
    pub fn total_price(&self) -> Decimal {
        self.quantity * self.unit_price - self.discount_amount
    }
}

/// Computed totals for a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub change_amount: Decimal,
}

/// Compute checkout totals from line items and tendered payments.
///
/// Change is floored at zero: underpayment yields zero change, not a
/// negative amount.
pub fn compute_sale_totals(
    lines: &[SaleLine],
    tax_amount: Decimal,
    discount_amount: Decimal,
    payments: &[Decimal],
) -> SaleTotals {
    let subtotal: Decimal = lines.iter().map(SaleLine::total_price).sum();
    let total_amount = subtotal + tax_amount - discount_amount;
    let paid_amount: Decimal = payments.iter().copied().sum();
    let change_amount = (paid_amount - total_amount).max(Decimal::ZERO);

    SaleTotals {
        subtotal,
        tax_amount,
        discount_amount,
        total_amount,
        paid_amount,
        change_amount,
    }
}

/// Loyalty points earned by a sale: one point per full `earn_threshold`
/// of spend. Zero when the threshold is unset or non-positive.
pub fn loyalty_points_earned(total_amount: Decimal, earn_threshold: Decimal) -> i32 {
    if earn_threshold <= Decimal::ZERO || total_amount < earn_threshold {
        return 0;
    }
    (total_amount / earn_threshold)
        .trunc()
        .to_i32()
        .unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_line_total() {
        let line = SaleLine {
            quantity: dec("3"),
            unit_price: dec("15000"),
            discount_amount: dec("5000"),
        };
        assert_eq!(line.total_price(), dec("40000"));
    }

    #[test]
    fn test_totals_with_change() {
        let lines = vec![
            SaleLine {
                quantity: dec("2"),
                unit_price: dec("10000"),
                discount_amount: Decimal::ZERO,
            },
            SaleLine {
                quantity: dec("1"),
                unit_price: dec("5000"),
                discount_amount: Decimal::ZERO,
            },
        ];
        let totals = compute_sale_totals(&lines, dec("2500"), dec("1000"), &[dec("30000")]);
        assert_eq!(totals.subtotal, dec("25000"));
        assert_eq!(totals.total_amount, dec("26500"));
        assert_eq!(totals.change_amount, dec("3500"));
    }

    #[test]
    fn test_totals_underpayment_has_zero_change() {
        let lines = vec![SaleLine {
            quantity: dec("1"),
            unit_price: dec("10000"),
            discount_amount: Decimal::ZERO,
        }];
        let totals = compute_sale_totals(&lines, Decimal::ZERO, Decimal::ZERO, &[dec("4000")]);
        assert_eq!(totals.change_amount, Decimal::ZERO);
        assert_eq!(totals.paid_amount, dec("4000"));
    }

    #[test]
    fn test_loyalty_points() {
        assert_eq!(loyalty_points_earned(dec("25000"), dec("10000")), 2);
        assert_eq!(loyalty_points_earned(dec("9999"), dec("10000")), 0);
        assert_eq!(loyalty_points_earned(dec("10000"), Decimal::ZERO), 0);
    }
}
