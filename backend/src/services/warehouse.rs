//! Warehouse management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, Pagination};

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Warehouse record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub warehouse_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub warehouse_type: Option<String>,
}

/// Input for updating a warehouse
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub warehouse_type: Option<String>,
    pub status: Option<String>,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List warehouses
    pub async fn list_warehouses(
        &self,
        search: Option<String>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Warehouse>> {
        let pagination = pagination.normalized();
        let search = search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM warehouses WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)",
        )
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let warehouses = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, name, code, address, phone, manager_id, store_id,
                   warehouse_type, status, created_at, updated_at
            FROM warehouses
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(warehouses, pagination, total as u64))
    }

    /// Get a warehouse by id
    pub async fn get_warehouse(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, name, code, address, phone, manager_id, store_id,
                   warehouse_type, status, created_at, updated_at
            FROM warehouses WHERE id = $1
            "#,
        )
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// Create a warehouse
    pub async fn create_warehouse(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        if input.name.trim().is_empty() || input.code.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Warehouse name and code are required".to_string(),
            ));
        }

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE code = $1")
                .bind(&input.code)
                .fetch_one(&self.db)
                .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let warehouse_type = input.warehouse_type.unwrap_or_else(|| "main".to_string());

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, code, address, phone, manager_id, store_id, warehouse_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, code, address, phone, manager_id, store_id,
                      warehouse_type, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(input.manager_id)
        .bind(input.store_id)
        .bind(&warehouse_type)
        .fetch_one(&self.db)
        .await?;

        Ok(warehouse)
    }

    /// Update a warehouse
    pub async fn update_warehouse(
        &self,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        let existing = self.get_warehouse(warehouse_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let address = input.address.or(existing.address);
        let phone = input.phone.or(existing.phone);
        let manager_id = input.manager_id.or(existing.manager_id);
        let store_id = input.store_id.or(existing.store_id);
        let warehouse_type = input.warehouse_type.unwrap_or(existing.warehouse_type);
        let status = input.status.unwrap_or(existing.status);

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
            SET name = $1, address = $2, phone = $3, manager_id = $4, store_id = $5,
                warehouse_type = $6, status = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING id, name, code, address, phone, manager_id, store_id,
                      warehouse_type, status, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&address)
        .bind(&phone)
        .bind(manager_id)
        .bind(store_id)
        .bind(&warehouse_type)
        .bind(&status)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(warehouse)
    }

    /// Delete a warehouse with no stock on hand
    pub async fn delete_warehouse(&self, warehouse_id: Uuid) -> AppResult<()> {
        self.get_warehouse(warehouse_id).await?;

        let stock = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM warehouse_inventory WHERE warehouse_id = $1 AND quantity > 0",
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        if stock > 0 {
            return Err(AppError::Conflict {
                resource: "warehouse".to_string(),
                message: "Warehouse still has stock on hand".to_string(),
                message_id: "Gudang masih memiliki stok".to_string(),
            });
        }

        sqlx::query("DELETE FROM warehouse_inventory WHERE warehouse_id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
