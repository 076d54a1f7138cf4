//! Stock movement engine
//!
//! Every stock-affecting business event (sale, purchase receipt, manual
//! adjustment, transfer) funnels through [`apply_movement`]: inside the
//! caller's transaction it locks or lazily creates the balance row for the
//! affected (product, variant, location) key, computes the new on-hand
//! quantity, persists it, and appends one immutable row to the movement
//! ledger. Any error aborts the caller's whole transaction, so partial
//! stock mutations never survive a failed business event.
//!
//! The balance row is locked with `SELECT ... FOR UPDATE` and held to
//! commit; concurrent movements against the same key serialize at the
//! database, so an `out` can never observe a stale quantity and oversell.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{LocationKind, LocationRef, MovementKind, ReferenceKind};

/// The operation a business event requests against one balance row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOperation {
    /// Goods arriving: purchase receipt, transfer destination
    Inbound { quantity: Decimal },
    /// Goods leaving: sale, transfer source
    Outbound { quantity: Decimal },
    /// Operator-supplied absolute target; ledger records `target - old`
    SetQuantity { target: Decimal },
}

/// Provenance of a movement, written to the ledger verbatim
#[derive(Debug, Clone)]
pub struct MovementContext {
    pub reference_kind: ReferenceKind,
    pub reference_id: Option<Uuid>,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

/// One immutable row of the movement ledger
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub location_kind: String,
    pub location_id: Uuid,
    pub warehouse_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub movement_kind: String,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub reference_kind: String,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Result of a movement: the ledger row plus before/after quantities
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMovement {
    pub movement: StockMovement,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
}

/// Balance row as seen by the mutator
#[derive(Debug, FromRow)]
struct StockLevelRow {
    id: Uuid,
    quantity: Decimal,
}

/// Apply one stock movement inside the caller's transaction.
///
/// Locks (or lazily creates) the balance row for the key, computes the new
/// quantity per the operation, rejects outbound movements that would drive
/// the balance negative, persists the quantity, and appends the ledger row.
pub async fn apply_movement(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    product_variant_id: Option<Uuid>,
    location: LocationRef,
    operation: StockOperation,
    ctx: MovementContext,
) -> AppResult<AppliedMovement> {
    let level = lock_or_create_level(tx, product_id, product_variant_id, location).await?;

    let (movement_kind, new_quantity, ledger_quantity) = match operation {
        StockOperation::Inbound { quantity } => {
            if quantity <= Decimal::ZERO {
                return Err(AppError::ValidationError(
                    "Movement quantity must be positive".to_string(),
                ));
            }
            (MovementKind::In, level.quantity + quantity, quantity)
        }
        StockOperation::Outbound { quantity } => {
            if quantity <= Decimal::ZERO {
                return Err(AppError::ValidationError(
                    "Movement quantity must be positive".to_string(),
                ));
            }
            if quantity > level.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "product {}: available {}, requested {}",
                    product_id, level.quantity, quantity
                )));
            }
            (MovementKind::Out, level.quantity - quantity, quantity)
        }
        StockOperation::SetQuantity { target } => {
            if target < Decimal::ZERO {
                return Err(AppError::ValidationError(
                    "Adjusted quantity cannot be negative".to_string(),
                ));
            }
            (MovementKind::Adjustment, target, target - level.quantity)
        }
    };

    set_level_quantity(tx, location.kind, level.id, new_quantity).await?;

    let movement = append_movement(
        tx,
        product_id,
        product_variant_id,
        location,
        movement_kind,
        ledger_quantity,
        &ctx,
    )
    .await?;

    tracing::debug!(
        product_id = %product_id,
        location = %location.id,
        kind = movement_kind.as_str(),
        previous = %level.quantity,
        new = %new_quantity,
        "stock level updated"
    );

    Ok(AppliedMovement {
        movement,
        previous_quantity: level.quantity,
        new_quantity,
    })
}

/// Lock the balance row for the key, creating it at quantity zero if it
/// does not exist yet. The row lock is held until the caller's transaction
/// commits or rolls back.
async fn lock_or_create_level(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    product_variant_id: Option<Uuid>,
    location: LocationRef,
) -> AppResult<StockLevelRow> {
    let select = match location.kind {
        LocationKind::Warehouse => {
            r#"
            SELECT id, quantity FROM warehouse_inventory
            WHERE product_id = $1
              AND product_variant_id IS NOT DISTINCT FROM $2
              AND warehouse_id = $3
            FOR UPDATE
            "#
        }
        LocationKind::Store => {
            r#"
            SELECT id, quantity FROM store_inventory
            WHERE product_id = $1
              AND product_variant_id IS NOT DISTINCT FROM $2
              AND store_id = $3
            FOR UPDATE
            "#
        }
    };

    let existing = sqlx::query_as::<_, StockLevelRow>(select)
        .bind(product_id)
        .bind(product_variant_id)
        .bind(location.id)
        .fetch_optional(&mut **tx)
        .await?;

    if let Some(level) = existing {
        return Ok(level);
    }

    let insert = match location.kind {
        LocationKind::Warehouse => {
            r#"
            INSERT INTO warehouse_inventory (product_id, product_variant_id, warehouse_id, quantity)
            VALUES ($1, $2, $3, 0)
            RETURNING id, quantity
            "#
        }
        LocationKind::Store => {
            r#"
            INSERT INTO store_inventory (product_id, product_variant_id, store_id, quantity)
            VALUES ($1, $2, $3, 0)
            RETURNING id, quantity
            "#
        }
    };

    let created = sqlx::query_as::<_, StockLevelRow>(insert)
        .bind(product_id)
        .bind(product_variant_id)
        .bind(location.id)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

/// Persist a new on-hand quantity for an already-locked balance row.
async fn set_level_quantity(
    tx: &mut Transaction<'_, Postgres>,
    kind: LocationKind,
    level_id: Uuid,
    quantity: Decimal,
) -> AppResult<()> {
    let update = match kind {
        LocationKind::Warehouse => {
            "UPDATE warehouse_inventory SET quantity = $1, last_updated = NOW() WHERE id = $2"
        }
        LocationKind::Store => {
            "UPDATE store_inventory SET quantity = $1, last_updated = NOW() WHERE id = $2"
        }
    };

    sqlx::query(update)
        .bind(quantity)
        .bind(level_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Append one row to the movement ledger. The ledger is write-once: no
/// update or delete path exists anywhere in the codebase.
async fn append_movement(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    product_variant_id: Option<Uuid>,
    location: LocationRef,
    movement_kind: MovementKind,
    quantity: Decimal,
    ctx: &MovementContext,
) -> AppResult<StockMovement> {
    let (warehouse_id, store_id) = match location.kind {
        LocationKind::Warehouse => (Some(location.id), None),
        LocationKind::Store => (None, Some(location.id)),
    };

    let movement = sqlx::query_as::<_, StockMovement>(
        r#"
        INSERT INTO stock_movements (
            product_id, product_variant_id, location_kind, location_id,
            warehouse_id, store_id, movement_kind, quantity, unit_cost,
            reference_kind, reference_id, notes, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id, product_id, product_variant_id, location_kind, location_id,
                  warehouse_id, store_id, movement_kind, quantity, unit_cost,
                  reference_kind, reference_id, notes, created_by, created_at
        "#,
    )
    .bind(product_id)
    .bind(product_variant_id)
    .bind(location.kind.as_str())
    .bind(location.id)
    .bind(warehouse_id)
    .bind(store_id)
    .bind(movement_kind.as_str())
    .bind(quantity)
    .bind(ctx.unit_cost)
    .bind(ctx.reference_kind.as_str())
    .bind(ctx.reference_id)
    .bind(&ctx.notes)
    .bind(ctx.created_by)
    .fetch_one(&mut **tx)
    .await?;

    Ok(movement)
}
