//! Purchase order status vocabulary and receiving arithmetic

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a purchase order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Pending,
    Approved,
    Partial,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Approved => "approved",
            PurchaseOrderStatus::Partial => "partial",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PurchaseOrderStatus::Draft),
            "pending" => Some(PurchaseOrderStatus::Pending),
            "approved" => Some(PurchaseOrderStatus::Approved),
            "partial" => Some(PurchaseOrderStatus::Partial),
            "received" => Some(PurchaseOrderStatus::Received),
            "cancelled" => Some(PurchaseOrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Receiving is allowed until the order is fully received or cancelled.
    pub fn can_receive(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Draft | PurchaseOrderStatus::Pending | PurchaseOrderStatus::Partial
        )
    }
}

/// (ordered, received) pair for one purchase order line
pub type LineProgress = (Decimal, Decimal);

/// Derive the order status from per-line received quantities.
///
/// Returns `Received` when every line has received >= ordered, `Partial`
/// when at least one line has received anything, `None` when nothing has
/// been received yet (status left as-is by the caller).
pub fn derive_receiving_status(lines: &[LineProgress]) -> Option<PurchaseOrderStatus> {
    let mut all_received = !lines.is_empty();
    let mut any_received = false;

    for (ordered, received) in lines {
        if *received > Decimal::ZERO {
            any_received = true;
        }
        if received < ordered {
            all_received = false;
        }
    }

    if all_received {
        Some(PurchaseOrderStatus::Received)
    } else if any_received {
        Some(PurchaseOrderStatus::Partial)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_nothing_received() {
        let lines = vec![(dec(10), dec(0)), (dec(5), dec(0))];
        assert_eq!(derive_receiving_status(&lines), None);
    }

    #[test]
    fn test_partial() {
        let lines = vec![(dec(10), dec(10)), (dec(5), dec(0))];
        assert_eq!(
            derive_receiving_status(&lines),
            Some(PurchaseOrderStatus::Partial)
        );
    }

    #[test]
    fn test_fully_received() {
        let lines = vec![(dec(10), dec(10)), (dec(5), dec(7))];
        assert_eq!(
            derive_receiving_status(&lines),
            Some(PurchaseOrderStatus::Received)
        );
    }

    #[test]
    fn test_can_receive() {
        assert!(PurchaseOrderStatus::Draft.can_receive());
        assert!(PurchaseOrderStatus::Partial.can_receive());
        assert!(!PurchaseOrderStatus::Received.can_receive());
        assert!(!PurchaseOrderStatus::Cancelled.can_receive());
    }
}
