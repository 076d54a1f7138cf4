//! Inventory service: stock level queries, location metadata, manual
//! adjustments, and the movement ledger read path
//!
//! Warehouse and store stock live in two parallel tables with identical
//! semantics; the write path for both goes through the stock movement
//! engine in [`crate::services::stock`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{self, AppliedMovement, MovementContext, StockMovement, StockOperation};
use shared::models::{LocationRef, ReferenceKind};
use shared::types::{PaginatedResponse, Pagination};
use shared::validation::validate_adjustment;

/// Inventory service for stock levels and the movement ledger
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Warehouse stock level row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WarehouseLevel {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Decimal,
    pub shelf_location: Option<String>,
    pub bin_location: Option<String>,
    pub zone: Option<String>,
    pub aisle: Option<String>,
    pub level: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Store stock level row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoreLevel {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub store_id: Uuid,
    pub quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Decimal,
    pub shelf_location: Option<String>,
    pub section: Option<String>,
    pub display_area: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Filter for stock level listings
#[derive(Debug, Default, Deserialize)]
pub struct LevelFilter {
    pub search: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

/// Input for updating warehouse level metadata (never the quantity)
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseLevelInput {
    pub shelf_location: Option<String>,
    pub bin_location: Option<String>,
    pub zone: Option<String>,
    pub aisle: Option<String>,
    pub level: Option<String>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
}

/// Input for updating store level metadata (never the quantity)
#[derive(Debug, Deserialize)]
pub struct UpdateStoreLevelInput {
    pub shelf_location: Option<String>,
    pub section: Option<String>,
    pub display_area: Option<String>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    /// Absolute target quantity, not a delta
    pub quantity: Decimal,
    pub reason: String,
}

/// Filter for movement ledger listings
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// A level that is at or below its minimum stock threshold
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LowStockRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub location_kind: String,
    pub location_id: Uuid,
    pub location_name: String,
    pub quantity: Decimal,
    pub min_stock: Decimal,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List warehouse stock levels, optionally filtered by warehouse and
    /// product name/SKU search
    pub async fn list_warehouse_levels(
        &self,
        filter: LevelFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<WarehouseLevel>> {
        let pagination = pagination.normalized();
        let search = filter.search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM warehouse_inventory wi
            JOIN products p ON p.id = wi.product_id
            WHERE ($1::uuid IS NULL OR wi.warehouse_id = $1)
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let levels = sqlx::query_as::<_, WarehouseLevel>(
            r#"
            SELECT wi.id, wi.product_id, wi.product_variant_id, wi.warehouse_id,
                   wi.quantity, wi.reserved_quantity, wi.min_stock, wi.max_stock,
                   wi.shelf_location, wi.bin_location, wi.zone, wi.aisle, wi.level,
                   wi.last_updated, wi.created_at
            FROM warehouse_inventory wi
            JOIN products p ON p.id = wi.product_id
            WHERE ($1::uuid IS NULL OR wi.warehouse_id = $1)
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
            ORDER BY wi.last_updated DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(levels, pagination, total as u64))
    }

    /// List store stock levels
    pub async fn list_store_levels(
        &self,
        filter: LevelFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StoreLevel>> {
        let pagination = pagination.normalized();
        let search = filter.search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM store_inventory si
            JOIN products p ON p.id = si.product_id
            WHERE ($1::uuid IS NULL OR si.store_id = $1)
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
            "#,
        )
        .bind(filter.store_id)
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let levels = sqlx::query_as::<_, StoreLevel>(
            r#"
            SELECT si.id, si.product_id, si.product_variant_id, si.store_id,
                   si.quantity, si.reserved_quantity, si.min_stock, si.max_stock,
                   si.shelf_location, si.section, si.display_area,
                   si.last_updated, si.created_at
            FROM store_inventory si
            JOIN products p ON p.id = si.product_id
            WHERE ($1::uuid IS NULL OR si.store_id = $1)
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
            ORDER BY si.last_updated DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.store_id)
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(levels, pagination, total as u64))
    }

    /// Get a single warehouse level by id
    pub async fn get_warehouse_level(&self, id: Uuid) -> AppResult<WarehouseLevel> {
        sqlx::query_as::<_, WarehouseLevel>(
            r#"
            SELECT id, product_id, product_variant_id, warehouse_id, quantity,
                   reserved_quantity, min_stock, max_stock, shelf_location,
                   bin_location, zone, aisle, level, last_updated, created_at
            FROM warehouse_inventory WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse inventory".to_string()))
    }

    /// Get a single store level by id
    pub async fn get_store_level(&self, id: Uuid) -> AppResult<StoreLevel> {
        sqlx::query_as::<_, StoreLevel>(
            r#"
            SELECT id, product_id, product_variant_id, store_id, quantity,
                   reserved_quantity, min_stock, max_stock, shelf_location,
                   section, display_area, last_updated, created_at
            FROM store_inventory WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Store inventory".to_string()))
    }

    /// Update warehouse level location metadata and thresholds. The
    /// quantity itself is only ever changed through stock movements.
    pub async fn update_warehouse_level(
        &self,
        id: Uuid,
        input: UpdateWarehouseLevelInput,
    ) -> AppResult<WarehouseLevel> {
        let existing = self.get_warehouse_level(id).await?;

        let shelf_location = input.shelf_location.or(existing.shelf_location);
        let bin_location = input.bin_location.or(existing.bin_location);
        let zone = input.zone.or(existing.zone);
        let aisle = input.aisle.or(existing.aisle);
        let level = input.level.or(existing.level);
        let min_stock = input.min_stock.unwrap_or(existing.min_stock);
        let max_stock = input.max_stock.unwrap_or(existing.max_stock);

        let updated = sqlx::query_as::<_, WarehouseLevel>(
            r#"
            UPDATE warehouse_inventory
            SET shelf_location = $1, bin_location = $2, zone = $3, aisle = $4,
                level = $5, min_stock = $6, max_stock = $7
            WHERE id = $8
            RETURNING id, product_id, product_variant_id, warehouse_id, quantity,
                      reserved_quantity, min_stock, max_stock, shelf_location,
                      bin_location, zone, aisle, level, last_updated, created_at
            "#,
        )
        .bind(&shelf_location)
        .bind(&bin_location)
        .bind(&zone)
        .bind(&aisle)
        .bind(&level)
        .bind(min_stock)
        .bind(max_stock)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(updated)
    }

    /// Update store level location metadata and thresholds
    pub async fn update_store_level(
        &self,
        id: Uuid,
        input: UpdateStoreLevelInput,
    ) -> AppResult<StoreLevel> {
        let existing = self.get_store_level(id).await?;

        let shelf_location = input.shelf_location.or(existing.shelf_location);
        let section = input.section.or(existing.section);
        let display_area = input.display_area.or(existing.display_area);
        let min_stock = input.min_stock.unwrap_or(existing.min_stock);
        let max_stock = input.max_stock.unwrap_or(existing.max_stock);

        let updated = sqlx::query_as::<_, StoreLevel>(
            r#"
            UPDATE store_inventory
            SET shelf_location = $1, section = $2, display_area = $3,
                min_stock = $4, max_stock = $5
            WHERE id = $6
            RETURNING id, product_id, product_variant_id, store_id, quantity,
                      reserved_quantity, min_stock, max_stock, shelf_location,
                      section, display_area, last_updated, created_at
            "#,
        )
        .bind(&shelf_location)
        .bind(&section)
        .bind(&display_area)
        .bind(min_stock)
        .bind(max_stock)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(updated)
    }

    /// Manually adjust a stock level to an operator-supplied absolute
    /// target. Writes one `adjustment` ledger row carrying the signed
    /// delta and the operator's reason.
    pub async fn adjust_level(
        &self,
        actor_id: Uuid,
        location: LocationRef,
        input: AdjustStockInput,
    ) -> AppResult<AppliedMovement> {
        validate_adjustment(input.quantity, &input.reason).map_err(|msg| {
            AppError::ValidationError(msg.to_string())
        })?;

        self.ensure_location_exists(location).await?;
        self.ensure_product_exists(input.product_id).await?;

        let mut tx = self.db.begin().await?;

        let applied = stock::apply_movement(
            &mut tx,
            input.product_id,
            input.product_variant_id,
            location,
            StockOperation::SetQuantity {
                target: input.quantity,
            },
            MovementContext {
                reference_kind: ReferenceKind::Adjustment,
                reference_id: None,
                unit_cost: None,
                notes: Some(input.reason),
                created_by: actor_id,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %input.product_id,
            location_id = %location.id,
            delta = %applied.movement.quantity,
            "manual stock adjustment applied"
        );

        Ok(applied)
    }

    /// List movement ledger entries, newest first
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        let pagination = pagination.normalized();

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR (location_kind = 'warehouse' AND location_id = $2))
              AND ($3::uuid IS NULL OR (location_kind = 'store' AND location_id = $3))
              AND ($4::date IS NULL OR created_at::date >= $4)
              AND ($5::date IS NULL OR created_at::date <= $5)
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.warehouse_id)
        .bind(filter.store_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_one(&self.db)
        .await?;

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, product_variant_id, location_kind, location_id,
                   warehouse_id, store_id, movement_kind, quantity, unit_cost,
                   reference_kind, reference_id, notes, created_by, created_at
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR (location_kind = 'warehouse' AND location_id = $2))
              AND ($3::uuid IS NULL OR (location_kind = 'store' AND location_id = $3))
              AND ($4::date IS NULL OR created_at::date >= $4)
              AND ($5::date IS NULL OR created_at::date <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.warehouse_id)
        .bind(filter.store_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(movements, pagination, total as u64))
    }

    /// Levels at or below their configured minimum, across both location
    /// kinds. Thresholds are reporting-only; nothing enforces them on
    /// write.
    pub async fn low_stock_report(&self) -> AppResult<Vec<LowStockRow>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT wi.product_id, p.name AS product_name, p.sku AS product_sku,
                   'warehouse' AS location_kind, wi.warehouse_id AS location_id,
                   w.name AS location_name, wi.quantity, wi.min_stock
            FROM warehouse_inventory wi
            JOIN products p ON p.id = wi.product_id
            JOIN warehouses w ON w.id = wi.warehouse_id
            WHERE wi.min_stock > 0 AND wi.quantity <= wi.min_stock
            UNION ALL
            SELECT si.product_id, p.name, p.sku,
                   'store', si.store_id, s.name, si.quantity, si.min_stock
            FROM store_inventory si
            JOIN products p ON p.id = si.product_id
            JOIN stores s ON s.id = si.store_id
            WHERE si.min_stock > 0 AND si.quantity <= si.min_stock
            ORDER BY quantity ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Levels with nothing on hand, across both location kinds
    pub async fn out_of_stock_report(&self) -> AppResult<Vec<LowStockRow>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT wi.product_id, p.name AS product_name, p.sku AS product_sku,
                   'warehouse' AS location_kind, wi.warehouse_id AS location_id,
                   w.name AS location_name, wi.quantity, wi.min_stock
            FROM warehouse_inventory wi
            JOIN products p ON p.id = wi.product_id
            JOIN warehouses w ON w.id = wi.warehouse_id
            WHERE wi.quantity <= 0
            UNION ALL
            SELECT si.product_id, p.name, p.sku,
                   'store', si.store_id, s.name, si.quantity, si.min_stock
            FROM store_inventory si
            JOIN products p ON p.id = si.product_id
            JOIN stores s ON s.id = si.store_id
            WHERE si.quantity <= 0
            ORDER BY product_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn ensure_product_exists(&self, product_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    async fn ensure_location_exists(&self, location: LocationRef) -> AppResult<()> {
        let query = match location.kind {
            shared::models::LocationKind::Warehouse => {
                "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)"
            }
            shared::models::LocationKind::Store => {
                "SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)"
            }
        };

        let exists = sqlx::query_scalar::<_, bool>(query)
            .bind(location.id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            let resource = match location.kind {
                shared::models::LocationKind::Warehouse => "Warehouse",
                shared::models::LocationKind::Store => "Store",
            };
            return Err(AppError::NotFound(resource.to_string()));
        }
        Ok(())
    }
}
