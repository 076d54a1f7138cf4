//! Store management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, Pagination};

/// Store service
#[derive(Clone)]
pub struct StoreService {
    db: PgPool,
}

/// Store record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub manager_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a store
#[derive(Debug, Deserialize)]
pub struct CreateStoreInput {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub manager_id: Option<Uuid>,
}

/// Input for updating a store
#[derive(Debug, Deserialize)]
pub struct UpdateStoreInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub manager_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Aggregate figures for one store
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub today_sales: i64,
    pub today_revenue: Decimal,
    pub product_count: i64,
}

impl StoreService {
    /// Create a new StoreService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stores
    pub async fn list_stores(
        &self,
        search: Option<String>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Store>> {
        let pagination = pagination.normalized();
        let search = search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stores WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)",
        )
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let stores = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, name, code, address, phone, email, manager_id, status,
                   created_at, updated_at
            FROM stores
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

        Ok(PaginatedResponse::new(stores, pagination, total as u64))
    }

    /// Get a store by id
    pub async fn get_store(&self, store_id: Uuid) -> AppResult<Store> {
        sqlx::query_as::<_, Store>(
            r#"
            SELECT id, name, code, address, phone, email, manager_id, status,
                   created_at, updated_at
            FROM stores WHERE id = $1
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))
    }

    /// Create a store
    pub async fn create_store(&self, input: CreateStoreInput) -> AppResult<Store> {
        if input.name.trim().is_empty() || input.code.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Store name and code are required".to_string(),
            ));
        }

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores WHERE code = $1")
            .bind(&input.code)
            .fetch_one(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (name, code, address, phone, email, manager_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, code, address, phone, email, manager_id, status,
                      created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.manager_id)
        .fetch_one(&self.db)
        .await?;

        Ok(store)
    }

    /// Update a store
    pub async fn update_store(&self, store_id: Uuid, input: UpdateStoreInput) -> AppResult<Store> {
        let existing = self.get_store(store_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let address = input.address.or(existing.address);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);
        let manager_id = input.manager_id.or(existing.manager_id);
        let status = input.status.unwrap_or(existing.status);

        let store = sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores
            SET name = $1, address = $2, phone = $3, email = $4, manager_id = $5,
                status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, name, code, address, phone, email, manager_id, status,
                      created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&address)
        .bind(&phone)
        .bind(&email)
        .bind(manager_id)
        .bind(&status)
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        Ok(store)
    }

    /// Delete a store that has no sales or stock
    pub async fn delete_store(&self, store_id: Uuid) -> AppResult<()> {
        self.get_store(store_id).await?;

        let sales = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(&self.db)
            .await?;
        let stock = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM store_inventory WHERE store_id = $1 AND quantity > 0",
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        if sales > 0 || stock > 0 {
            return Err(AppError::Conflict {
                resource: "store".to_string(),
                message: "Store still has sales history or stock on hand".to_string(),
                message_id: "Toko masih memiliki riwayat penjualan atau stok".to_string(),
            });
        }

        sqlx::query("DELETE FROM store_inventory WHERE store_id = $1")
            .bind(store_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(store_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Aggregate sales and stock figures for a store
    pub async fn get_store_stats(&self, store_id: Uuid) -> AppResult<StoreStats> {
        self.get_store(store_id).await?;

        let (total_sales, total_revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales WHERE store_id = $1 AND sale_status = 'completed'
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        let (today_sales, today_revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE store_id = $1 AND sale_status = 'completed'
              AND sale_date::date = CURRENT_DATE
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        let product_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT product_id) FROM store_inventory WHERE store_id = $1 AND quantity > 0",
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        Ok(StoreStats {
            total_sales,
            total_revenue,
            today_sales,
            today_revenue,
            product_count,
        })
    }
}
