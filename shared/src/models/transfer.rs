//! Stock transfer status vocabulary

use serde::{Deserialize, Serialize};

/// Lifecycle of an inter-location stock transfer
///
/// Execution is single-step: a pending transfer moves straight to
/// completed, with shipped and received stamped together. `InTransit` is
/// carried for forward compatibility with a split ship/receive flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InTransit,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransferStatus::Pending),
            "in_transit" => Some(TransferStatus::InTransit),
            "completed" => Some(TransferStatus::Completed),
            "cancelled" => Some(TransferStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_execute(&self) -> bool {
        matches!(self, TransferStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_executes() {
        assert!(TransferStatus::Pending.can_execute());
        assert!(!TransferStatus::InTransit.can_execute());
        assert!(!TransferStatus::Completed.can_execute());
        assert!(!TransferStatus::Cancelled.can_execute());
    }
}
