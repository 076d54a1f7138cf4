//! Stock location and movement vocabulary
//!
//! Stock lives in two physically separate tables (warehouse and store
//! inventory) with identical semantics; `LocationKind` selects between
//! them. Every quantity change is recorded as an immutable movement row
//! tagged with a kind and a reference back to the causing business event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which balance table a stock record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Warehouse,
    Store,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Warehouse => "warehouse",
            LocationKind::Store => "store",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "warehouse" => Some(LocationKind::Warehouse),
            "store" => Some(LocationKind::Store),
            _ => None,
        }
    }
}

/// A concrete stock location: kind plus row id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub kind: LocationKind,
    pub id: Uuid,
}

impl LocationRef {
    pub fn warehouse(id: Uuid) -> Self {
        Self {
            kind: LocationKind::Warehouse,
            id,
        }
    }

    pub fn store(id: Uuid) -> Self {
        Self {
            kind: LocationKind::Store,
            id,
        }
    }
}

/// Kind of a stock movement
///
/// Transfers are recorded as a paired `out` at the source and `in` at the
/// destination, not as a kind of their own. `in`/`out` rows store the
/// unsigned magnitude; `adjustment` rows store the signed delta
/// (target minus previous). The kind is authoritative when interpreting
/// the quantity column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
    Adjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
            MovementKind::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MovementKind::In),
            "out" => Some(MovementKind::Out),
            "adjustment" => Some(MovementKind::Adjustment),
            _ => None,
        }
    }
}

/// Business entity a movement traces back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Sale,
    Purchase,
    Transfer,
    Adjustment,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Sale => "sale",
            ReferenceKind::Purchase => "purchase",
            ReferenceKind::Transfer => "transfer",
            ReferenceKind::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(ReferenceKind::Sale),
            "purchase" => Some(ReferenceKind::Purchase),
            "transfer" => Some(ReferenceKind::Transfer),
            "adjustment" => Some(ReferenceKind::Adjustment),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_kind_round_trip() {
        for kind in [LocationKind::Warehouse, LocationKind::Store] {
            assert_eq!(LocationKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(LocationKind::from_str("shelf"), None);
    }

    #[test]
    fn test_movement_kind_round_trip() {
        for kind in [
            MovementKind::In,
            MovementKind::Out,
            MovementKind::Adjustment,
        ] {
            assert_eq!(MovementKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(MovementKind::from_str("transfer"), None);
    }
}
