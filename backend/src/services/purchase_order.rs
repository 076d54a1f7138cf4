//! Purchase order service: ordering from suppliers and receiving goods
//! into warehouse stock
//!
//! Receiving is the inbound stock-affecting business event: each received
//! line bumps the item's cumulative received quantity and applies one
//! inbound stock movement at the order's warehouse, all in one
//! transaction. Partial receipts are allowed and the order status is
//! re-derived after every receipt.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{self, MovementContext, StockOperation};
use shared::models::{
    derive_receiving_status, LocationRef, PurchaseOrderStatus, ReferenceKind,
};
use shared::types::{PaginatedResponse, Pagination};
use shared::validation::validate_movement_magnitude;

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: PgPool,
}

/// Purchase order record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub purchase_number: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: String,
    pub supplier_contact: Option<String>,
    pub warehouse_id: Uuid,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub expected_date: Option<NaiveDate>,
    pub received_date: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase order line item record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity_ordered: Decimal,
    pub quantity_received: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Purchase order with its items
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderWithItems {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

/// One ordered line
#[derive(Debug, Deserialize)]
pub struct PurchaseOrderItemInput {
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity_ordered: Decimal,
    pub unit_cost: Decimal,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub supplier_contact: Option<String>,
    pub warehouse_id: Uuid,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<PurchaseOrderItemInput>,
}

/// One received line in a receiving action
#[derive(Debug, Deserialize)]
pub struct ReceiveItemInput {
    pub item_id: Uuid,
    pub quantity_received: Decimal,
}

/// Input for receiving purchase order items
#[derive(Debug, Deserialize)]
pub struct ReceivePurchaseOrderInput {
    pub items: Vec<ReceiveItemInput>,
}

/// Filter for purchase order listings
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

impl PurchaseOrderService {
    /// Create a new PurchaseOrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase order in draft status
    pub async fn create_order(
        &self,
        created_by: Uuid,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrderWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Purchase order must have at least one item".to_string(),
                message_id: "Pesanan pembelian harus memiliki minimal satu item".to_string(),
            });
        }
        for item in &input.items {
            validate_movement_magnitude(item.quantity_ordered)
                .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
            if item.unit_cost < Decimal::ZERO {
                return Err(AppError::ValidationError(
                    "Unit cost cannot be negative".to_string(),
                ));
            }
        }

        // Must have either a registered supplier or an ad-hoc name
        let mut supplier_name = input.supplier_name.clone().unwrap_or_default();
        let mut supplier_contact = input.supplier_contact.clone();

        if let Some(supplier_id) = input.supplier_id {
            let supplier = sqlx::query_as::<_, (String, Option<String>)>(
                "SELECT name, contact FROM suppliers WHERE id = $1",
            )
            .bind(supplier_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

            if supplier_name.is_empty() {
                supplier_name = supplier.0;
            }
            if supplier_contact.is_none() {
                supplier_contact = supplier.1;
            }
        } else if supplier_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "supplier".to_string(),
                message: "Either supplier_id or supplier_name is required".to_string(),
                message_id: "Harus mengisi supplier_id atau supplier_name".to_string(),
            });
        }

        let warehouse_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(input.warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let purchase_number = generate_purchase_number(input.warehouse_id);
        let total_amount: Decimal = input
            .items
            .iter()
            .map(|i| i.quantity_ordered * i.unit_cost)
            .sum();

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (
                purchase_number, supplier_id, supplier_name, supplier_contact,
                warehouse_id, status, order_date, expected_date, total_amount,
                notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), $7, $8, $9, $10)
            RETURNING id, purchase_number, supplier_id, supplier_name, supplier_contact,
                      warehouse_id, status, order_date, expected_date, received_date,
                      total_amount, notes, created_by, created_at, updated_at
            "#,
        )
        .bind(&purchase_number)
        .bind(input.supplier_id)
        .bind(&supplier_name)
        .bind(&supplier_contact)
        .bind(input.warehouse_id)
        .bind(PurchaseOrderStatus::Draft.as_str())
        .bind(input.expected_date)
        .bind(total_amount)
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let created = sqlx::query_as::<_, PurchaseOrderItem>(
                r#"
                INSERT INTO purchase_order_items (
                    purchase_order_id, product_id, product_variant_id,
                    quantity_ordered, unit_cost, total_cost
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, purchase_order_id, product_id, product_variant_id,
                          quantity_ordered, quantity_received, unit_cost, total_cost,
                          created_at
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.product_variant_id)
            .bind(item.quantity_ordered)
            .bind(item.unit_cost)
            .bind(item.quantity_ordered * item.unit_cost)
            .fetch_one(&mut *tx)
            .await?;
            items.push(created);
        }

        tx.commit().await?;

        tracing::info!(
            purchase_number = %purchase_number,
            warehouse_id = %input.warehouse_id,
            total = %total_amount,
            "purchase order created"
        );

        Ok(PurchaseOrderWithItems { order, items })
    }

    /// Receive goods against a purchase order. May be called repeatedly
    /// for partial receipts; each call applies one inbound stock movement
    /// per received line and re-derives the order status.
    pub async fn receive_order(
        &self,
        actor_id: Uuid,
        order_id: Uuid,
        input: ReceivePurchaseOrderInput,
    ) -> AppResult<PurchaseOrderWithItems> {
        if input.items.is_empty() {
            return Err(AppError::ValidationError(
                "Nothing to receive".to_string(),
            ));
        }
        for item in &input.items {
            validate_movement_magnitude(item.quantity_received)
                .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        }

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, purchase_number, supplier_id, supplier_name, supplier_contact,
                   warehouse_id, status, order_date, expected_date, received_date,
                   total_amount, notes, created_by, created_at, updated_at
            FROM purchase_orders WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let status = PurchaseOrderStatus::from_str(&order.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown purchase order status: {}", order.status))
        })?;
        if !status.can_receive() {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase order in status '{}' cannot be received",
                order.status
            )));
        }

        for receive in &input.items {
            let item = sqlx::query_as::<_, PurchaseOrderItem>(
                r#"
                SELECT id, purchase_order_id, product_id, product_variant_id,
                       quantity_ordered, quantity_received, unit_cost, total_cost,
                       created_at
                FROM purchase_order_items
                WHERE id = $1 AND purchase_order_id = $2
                "#,
            )
            .bind(receive.item_id)
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Item {} not found in purchase order",
                    receive.item_id
                ))
            })?;

            sqlx::query(
                "UPDATE purchase_order_items SET quantity_received = quantity_received + $1 WHERE id = $2",
            )
            .bind(receive.quantity_received)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;

            stock::apply_movement(
                &mut tx,
                item.product_id,
                item.product_variant_id,
                LocationRef::warehouse(order.warehouse_id),
                StockOperation::Inbound {
                    quantity: receive.quantity_received,
                },
                MovementContext {
                    reference_kind: ReferenceKind::Purchase,
                    reference_id: Some(order.id),
                    unit_cost: Some(item.unit_cost),
                    notes: Some(format!("Received from PO: {}", order.purchase_number)),
                    created_by: actor_id,
                },
            )
            .await?;
        }

        // Re-derive status from the full set of lines
        let progress = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT quantity_ordered, quantity_received FROM purchase_order_items WHERE purchase_order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(new_status) = derive_receiving_status(&progress) {
            let received_date = matches!(new_status, PurchaseOrderStatus::Received);
            sqlx::query(
                r#"
                UPDATE purchase_orders
                SET status = $1,
                    received_date = CASE WHEN $2 THEN NOW() ELSE received_date END,
                    updated_at = NOW()
                WHERE id = $3
                "#,
            )
            .bind(new_status.as_str())
            .bind(received_date)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            purchase_number = %order.purchase_number,
            lines = input.items.len(),
            "purchase order receipt recorded"
        );

        self.get_order(order_id).await
    }

    /// Get a purchase order with its items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<PurchaseOrderWithItems> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, purchase_number, supplier_id, supplier_name, supplier_contact,
                   warehouse_id, status, order_date, expected_date, received_date,
                   total_amount, notes, created_by, created_at, updated_at
            FROM purchase_orders WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            SELECT id, purchase_order_id, product_id, product_variant_id,
                   quantity_ordered, quantity_received, unit_cost, total_cost,
                   created_at
            FROM purchase_order_items WHERE purchase_order_id = $1 ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseOrderWithItems { order, items })
    }

    /// List purchase orders, newest first
    pub async fn list_orders(
        &self,
        filter: PurchaseOrderFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<PurchaseOrder>> {
        let pagination = pagination.normalized();

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM purchase_orders
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR warehouse_id = $2)
            "#,
        )
        .bind(&filter.status)
        .bind(filter.warehouse_id)
        .fetch_one(&self.db)
        .await?;

        let orders = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, purchase_number, supplier_id, supplier_name, supplier_contact,
                   warehouse_id, status, order_date, expected_date, received_date,
                   total_amount, notes, created_by, created_at, updated_at
            FROM purchase_orders
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR warehouse_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.status)
        .bind(filter.warehouse_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(orders, pagination, total as u64))
    }
}

/// Generate a unique purchase number: PO + epoch seconds + warehouse suffix
fn generate_purchase_number(warehouse_id: Uuid) -> String {
    let suffix = warehouse_id.as_simple().to_string();
    format!(
        "PO-{}-{}",
        Utc::now().timestamp(),
        &suffix[..8]
    )
}
