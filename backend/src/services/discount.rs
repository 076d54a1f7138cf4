//! Discount management service
//!
//! Discounts are created and deactivated rather than deleted: usage rows
//! written at checkout reference them permanently.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::DiscountType;
use shared::types::{PaginatedResponse, Pagination};

/// Discount service
#[derive(Clone)]
pub struct DiscountService {
    db: PgPool,
}

/// Discount record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Discount {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_purchase: Decimal,
    pub max_discount: Decimal,
    pub usage_limit: i32,
    pub usage_count: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub store_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a discount
#[derive(Debug, Deserialize)]
pub struct CreateDiscountInput {
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_purchase: Decimal,
    #[serde(default)]
    pub max_discount: Decimal,
    #[serde(default)]
    pub usage_limit: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub store_id: Option<Uuid>,
}

impl DiscountService {
    /// Create a new DiscountService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List discounts
    pub async fn list_discounts(
        &self,
        active_only: bool,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Discount>> {
        let pagination = pagination.normalized();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM discounts WHERE (NOT $1 OR is_active)",
        )
        .bind(active_only)
        .fetch_one(&self.db)
        .await?;

        let discounts = sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, name, code, description, discount_type, discount_value,
                   min_purchase, max_discount, usage_limit, usage_count, start_date,
                   end_date, is_active, store_id, created_by, created_at, updated_at
            FROM discounts
            WHERE (NOT $1 OR is_active)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(active_only)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(discounts, pagination, total as u64))
    }

    /// Get a discount by id
    pub async fn get_discount(&self, discount_id: Uuid) -> AppResult<Discount> {
        sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, name, code, description, discount_type, discount_value,
                   min_purchase, max_discount, usage_limit, usage_count, start_date,
                   end_date, is_active, store_id, created_by, created_at, updated_at
            FROM discounts WHERE id = $1
            "#,
        )
        .bind(discount_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Discount".to_string()))
    }

    /// Create a discount
    pub async fn create_discount(
        &self,
        created_by: Uuid,
        input: CreateDiscountInput,
    ) -> AppResult<Discount> {
        if input.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Discount name is required".to_string(),
            ));
        }
        if DiscountType::from_str(&input.discount_type).is_none() {
            return Err(AppError::Validation {
                field: "discount_type".to_string(),
                message: "Discount type must be 'percentage' or 'fixed'".to_string(),
                message_id: "Jenis diskon harus 'percentage' atau 'fixed'".to_string(),
            });
        }
        if input.discount_value <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Discount value must be positive".to_string(),
            ));
        }

        if let Some(ref code) = input.code {
            let existing =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM discounts WHERE code = $1")
                    .bind(code)
                    .fetch_one(&self.db)
                    .await?;
            if existing > 0 {
                return Err(AppError::DuplicateEntry("code".to_string()));
            }
        }

        let discount = sqlx::query_as::<_, Discount>(
            r#"
            INSERT INTO discounts (
                name, code, description, discount_type, discount_value, min_purchase,
                max_discount, usage_limit, start_date, end_date, store_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, name, code, description, discount_type, discount_value,
                      min_purchase, max_discount, usage_limit, usage_count, start_date,
                      end_date, is_active, store_id, created_by, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(&input.discount_type)
        .bind(input.discount_value)
        .bind(input.min_purchase)
        .bind(input.max_discount)
        .bind(input.usage_limit)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.store_id)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(discount)
    }

    /// Deactivate a discount
    pub async fn deactivate_discount(&self, discount_id: Uuid) -> AppResult<Discount> {
        self.get_discount(discount_id).await?;

        let discount = sqlx::query_as::<_, Discount>(
            r#"
            UPDATE discounts SET is_active = false, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, code, description, discount_type, discount_value,
                      min_purchase, max_discount, usage_limit, usage_count, start_date,
                      end_date, is_active, store_id, created_by, created_at, updated_at
            "#,
        )
        .bind(discount_id)
        .fetch_one(&self.db)
        .await?;

        Ok(discount)
    }
}
