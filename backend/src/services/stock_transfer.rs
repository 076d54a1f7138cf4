//! Stock transfer service: moving goods between warehouses and stores
//!
//! A transfer is created in pending status with a sufficiency pre-check,
//! then executed in a single step: for every item one outbound movement at
//! the source and one inbound movement at the destination, both
//! referencing the transfer, inside one transaction. Source sufficiency is
//! re-checked under the row lock at execution time, so a transfer that
//! raced with a sale rolls back instead of overselling.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{self, MovementContext, StockOperation};
use shared::models::{LocationKind, LocationRef, ReferenceKind, TransferStatus};
use shared::types::{PaginatedResponse, Pagination};
use shared::validation::{validate_movement_magnitude, validate_transfer_endpoints};

/// Stock transfer service
#[derive(Clone)]
pub struct StockTransferService {
    db: PgPool,
}

/// Stock transfer record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockTransfer {
    pub id: Uuid,
    pub transfer_number: String,
    pub from_warehouse_id: Option<Uuid>,
    pub to_warehouse_id: Option<Uuid>,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    pub status: String,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockTransfer {
    /// Source location of this transfer
    pub fn source(&self) -> AppResult<LocationRef> {
        match (self.from_warehouse_id, self.from_store_id) {
            (Some(id), None) => Ok(LocationRef::warehouse(id)),
            (None, Some(id)) => Ok(LocationRef::store(id)),
            _ => Err(AppError::Internal(
                "Transfer has no unambiguous source location".to_string(),
            )),
        }
    }

    /// Destination location of this transfer
    pub fn destination(&self) -> AppResult<LocationRef> {
        match (self.to_warehouse_id, self.to_store_id) {
            (Some(id), None) => Ok(LocationRef::warehouse(id)),
            (None, Some(id)) => Ok(LocationRef::store(id)),
            _ => Err(AppError::Internal(
                "Transfer has no unambiguous destination location".to_string(),
            )),
        }
    }
}

/// Stock transfer line item record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockTransferItem {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity_requested: Decimal,
    pub quantity_shipped: Decimal,
    pub quantity_received: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Transfer with its items
#[derive(Debug, Clone, Serialize)]
pub struct StockTransferWithItems {
    #[serde(flatten)]
    pub transfer: StockTransfer,
    pub items: Vec<StockTransferItem>,
}

/// One requested line
#[derive(Debug, Deserialize)]
pub struct TransferItemInput {
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity_requested: Decimal,
}

/// Input for creating a stock transfer
#[derive(Debug, Deserialize)]
pub struct CreateTransferInput {
    pub from_warehouse_id: Option<Uuid>,
    pub to_warehouse_id: Option<Uuid>,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    pub notes: Option<String>,
    pub items: Vec<TransferItemInput>,
}

/// Filter for transfer listings
#[derive(Debug, Default, Deserialize)]
pub struct TransferFilter {
    pub status: Option<String>,
}

impl StockTransferService {
    /// Create a new StockTransferService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a pending stock transfer after validating endpoints and
    /// source stock availability
    pub async fn create_transfer(
        &self,
        requested_by: Uuid,
        input: CreateTransferInput,
    ) -> AppResult<StockTransferWithItems> {
        let (from, to) = validate_transfer_endpoints(
            input.from_warehouse_id,
            input.from_store_id,
            input.to_warehouse_id,
            input.to_store_id,
        )
        .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Transfer must have at least one item".to_string(),
                message_id: "Transfer harus memiliki minimal satu item".to_string(),
            });
        }
        for item in &input.items {
            validate_movement_magnitude(item.quantity_requested)
                .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        }

        self.ensure_location_exists(from).await?;
        self.ensure_location_exists(to).await?;

        // Advisory availability check at creation time; the authoritative
        // check happens under the row lock during execution.
        for item in &input.items {
            let available = self
                .current_quantity(from, item.product_id, item.product_variant_id)
                .await?;
            if available < item.quantity_requested {
                return Err(AppError::InsufficientStock(format!(
                    "product {}: available {}, requested {}",
                    item.product_id, available, item.quantity_requested
                )));
            }
        }

        let transfer_number = generate_transfer_number();

        let mut tx = self.db.begin().await?;

        let transfer = sqlx::query_as::<_, StockTransfer>(
            r#"
            INSERT INTO stock_transfers (
                transfer_number, from_warehouse_id, to_warehouse_id,
                from_store_id, to_store_id, status, requested_by, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, transfer_number, from_warehouse_id, to_warehouse_id,
                      from_store_id, to_store_id, status, requested_by, approved_by,
                      shipped_at, received_at, notes, created_at, updated_at
            "#,
        )
        .bind(&transfer_number)
        .bind(input.from_warehouse_id)
        .bind(input.to_warehouse_id)
        .bind(input.from_store_id)
        .bind(input.to_store_id)
        .bind(TransferStatus::Pending.as_str())
        .bind(requested_by)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let created = sqlx::query_as::<_, StockTransferItem>(
                r#"
                INSERT INTO stock_transfer_items (
                    transfer_id, product_id, product_variant_id, quantity_requested
                )
                VALUES ($1, $2, $3, $4)
                RETURNING id, transfer_id, product_id, product_variant_id,
                          quantity_requested, quantity_shipped, quantity_received,
                          created_at
                "#,
            )
            .bind(transfer.id)
            .bind(item.product_id)
            .bind(item.product_variant_id)
            .bind(item.quantity_requested)
            .fetch_one(&mut *tx)
            .await?;
            items.push(created);
        }

        tx.commit().await?;

        tracing::info!(
            transfer_number = %transfer_number,
            items = items.len(),
            "stock transfer created"
        );

        Ok(StockTransferWithItems { transfer, items })
    }

    /// Execute a pending transfer: one outbound movement at the source and
    /// one inbound movement at the destination per item, atomically. Both
    /// movements reference the transfer; either all items move or none do.
    pub async fn execute_transfer(
        &self,
        actor_id: Uuid,
        transfer_id: Uuid,
    ) -> AppResult<StockTransferWithItems> {
        let mut tx = self.db.begin().await?;

        let transfer = sqlx::query_as::<_, StockTransfer>(
            r#"
            SELECT id, transfer_number, from_warehouse_id, to_warehouse_id,
                   from_store_id, to_store_id, status, requested_by, approved_by,
                   shipped_at, received_at, notes, created_at, updated_at
            FROM stock_transfers WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(transfer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock transfer".to_string()))?;

        let status = TransferStatus::from_str(&transfer.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown transfer status: {}", transfer.status))
        })?;
        if !status.can_execute() {
            return Err(AppError::InvalidStateTransition(format!(
                "Stock transfer in status '{}' cannot be executed",
                transfer.status
            )));
        }

        let from = transfer.source()?;
        let to = transfer.destination()?;

        let items = sqlx::query_as::<_, StockTransferItem>(
            r#"
            SELECT id, transfer_id, product_id, product_variant_id,
                   quantity_requested, quantity_shipped, quantity_received,
                   created_at
            FROM stock_transfer_items WHERE transfer_id = $1 ORDER BY created_at
            "#,
        )
        .bind(transfer_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            let quantity = item.quantity_requested;

            stock::apply_movement(
                &mut tx,
                item.product_id,
                item.product_variant_id,
                from,
                StockOperation::Outbound { quantity },
                MovementContext {
                    reference_kind: ReferenceKind::Transfer,
                    reference_id: Some(transfer.id),
                    unit_cost: None,
                    notes: Some(format!("Transfer out: {}", transfer.transfer_number)),
                    created_by: actor_id,
                },
            )
            .await?;

            stock::apply_movement(
                &mut tx,
                item.product_id,
                item.product_variant_id,
                to,
                StockOperation::Inbound { quantity },
                MovementContext {
                    reference_kind: ReferenceKind::Transfer,
                    reference_id: Some(transfer.id),
                    unit_cost: None,
                    notes: Some(format!("Transfer in: {}", transfer.transfer_number)),
                    created_by: actor_id,
                },
            )
            .await?;

            sqlx::query(
                "UPDATE stock_transfer_items SET quantity_shipped = $1, quantity_received = $1 WHERE id = $2",
            )
            .bind(quantity)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
        }

        // Single-step execution: shipped and received are stamped together
        sqlx::query(
            r#"
            UPDATE stock_transfers
            SET status = $1, shipped_at = NOW(), received_at = NOW(), updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(TransferStatus::Completed.as_str())
        .bind(transfer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            transfer_number = %transfer.transfer_number,
            items = items.len(),
            "stock transfer executed"
        );

        self.get_transfer(transfer_id).await
    }

    /// Get a transfer with its items
    pub async fn get_transfer(&self, transfer_id: Uuid) -> AppResult<StockTransferWithItems> {
        let transfer = sqlx::query_as::<_, StockTransfer>(
            r#"
            SELECT id, transfer_number, from_warehouse_id, to_warehouse_id,
                   from_store_id, to_store_id, status, requested_by, approved_by,
                   shipped_at, received_at, notes, created_at, updated_at
            FROM stock_transfers WHERE id = $1
            "#,
        )
        .bind(transfer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock transfer".to_string()))?;

        let items = sqlx::query_as::<_, StockTransferItem>(
            r#"
            SELECT id, transfer_id, product_id, product_variant_id,
                   quantity_requested, quantity_shipped, quantity_received,
                   created_at
            FROM stock_transfer_items WHERE transfer_id = $1 ORDER BY created_at
            "#,
        )
        .bind(transfer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(StockTransferWithItems { transfer, items })
    }

    /// List transfers, newest first
    pub async fn list_transfers(
        &self,
        filter: TransferFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StockTransfer>> {
        let pagination = pagination.normalized();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_transfers WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(&filter.status)
        .fetch_one(&self.db)
        .await?;

        let transfers = sqlx::query_as::<_, StockTransfer>(
            r#"
            SELECT id, transfer_number, from_warehouse_id, to_warehouse_id,
                   from_store_id, to_store_id, status, requested_by, approved_by,
                   shipped_at, received_at, notes, created_at, updated_at
            FROM stock_transfers
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&filter.status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(transfers, pagination, total as u64))
    }

    /// Current on-hand quantity at a location, zero if no balance row yet
    async fn current_quantity(
        &self,
        location: LocationRef,
        product_id: Uuid,
        product_variant_id: Option<Uuid>,
    ) -> AppResult<Decimal> {
        let query = match location.kind {
            LocationKind::Warehouse => {
                r#"
                SELECT quantity FROM warehouse_inventory
                WHERE product_id = $1
                  AND product_variant_id IS NOT DISTINCT FROM $2
                  AND warehouse_id = $3
                "#
            }
            LocationKind::Store => {
                r#"
                SELECT quantity FROM store_inventory
                WHERE product_id = $1
                  AND product_variant_id IS NOT DISTINCT FROM $2
                  AND store_id = $3
                "#
            }
        };

        let quantity = sqlx::query_scalar::<_, Decimal>(query)
            .bind(product_id)
            .bind(product_variant_id)
            .bind(location.id)
            .fetch_optional(&self.db)
            .await?;

        Ok(quantity.unwrap_or(Decimal::ZERO))
    }

    async fn ensure_location_exists(&self, location: LocationRef) -> AppResult<()> {
        let (query, resource) = match location.kind {
            LocationKind::Warehouse => (
                "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
                "Warehouse",
            ),
            LocationKind::Store => ("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)", "Store"),
        };

        let exists = sqlx::query_scalar::<_, bool>(query)
            .bind(location.id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            return Err(AppError::NotFound(resource.to_string()));
        }
        Ok(())
    }
}

/// Generate a unique transfer number: ST + epoch millis
fn generate_transfer_number() -> String {
    format!("ST-{}", Utc::now().timestamp_millis())
}
