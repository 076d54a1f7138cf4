//! Supplier management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, Pagination};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Supplier record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating/updating a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers
    pub async fn list_suppliers(
        &self,
        search: Option<String>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Supplier>> {
        let pagination = pagination.normalized();
        let search = search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM suppliers WHERE ($1::text IS NULL OR name ILIKE $1 OR contact ILIKE $1)",
        )
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact, email, phone, address, status, created_at, updated_at
            FROM suppliers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR contact ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(suppliers, pagination, total as u64))
    }

    /// Get a supplier by id
    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact, email, phone, address, status, created_at, updated_at
            FROM suppliers WHERE id = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Create a supplier
    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        if input.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Supplier name is required".to_string(),
            ));
        }

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, contact, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, contact, email, phone, address, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Update a supplier
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: SupplierInput,
    ) -> AppResult<Supplier> {
        let existing = self.get_supplier(supplier_id).await?;

        let contact = input.contact.or(existing.contact);
        let email = input.email.or(existing.email);
        let phone = input.phone.or(existing.phone);
        let address = input.address.or(existing.address);
        let status = input.status.unwrap_or(existing.status);

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, contact = $2, email = $3, phone = $4, address = $5,
                status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, name, contact, email, phone, address, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&contact)
        .bind(&email)
        .bind(&phone)
        .bind(&address)
        .bind(&status)
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Delete a supplier with no purchase orders
    pub async fn delete_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        self.get_supplier(supplier_id).await?;

        let orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchase_orders WHERE supplier_id = $1",
        )
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;
        if orders > 0 {
            return Err(AppError::Conflict {
                resource: "supplier".to_string(),
                message: "Supplier has purchase orders".to_string(),
                message_id: "Pemasok memiliki pesanan pembelian".to_string(),
            });
        }

        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
