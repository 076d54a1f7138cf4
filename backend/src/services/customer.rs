//! Customer management service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, Pagination};

/// Customer service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Customer record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub is_member: bool,
    pub loyalty_points: i32,
    pub total_spent: Decimal,
    pub last_visit: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerInput {
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    #[serde(default)]
    pub is_member: bool,
}

/// Input for updating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub is_member: Option<bool>,
    pub status: Option<String>,
}

/// Per-customer purchase statistics
#[derive(Debug, Clone, Serialize)]
pub struct CustomerStats {
    pub total_purchases: i64,
    pub total_spent: Decimal,
    pub average_purchase: Decimal,
    pub loyalty_points: i32,
    pub last_visit: Option<DateTime<Utc>>,
}

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List customers
    pub async fn list_customers(
        &self,
        search: Option<String>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Customer>> {
        let pagination = pagination.normalized();
        let search = search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM customers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1)
            "#,
        )
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, date_of_birth, gender, is_member,
                   loyalty_points, total_spent, last_visit, status, created_at, updated_at
            FROM customers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(customers, pagination, total as u64))
    }

    /// Get a customer by id
    pub async fn get_customer(&self, customer_id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, date_of_birth, gender, is_member,
                   loyalty_points, total_spent, last_visit, status, created_at, updated_at
            FROM customers WHERE id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Create a customer
    pub async fn create_customer(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if input.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Customer name is required".to_string(),
            ));
        }

        if let Some(ref email) = input.email {
            let existing =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE email = $1")
                    .bind(email)
                    .fetch_one(&self.db)
                    .await?;
            if existing > 0 {
                return Err(AppError::DuplicateEntry("email".to_string()));
            }
        }

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, email, phone, address, date_of_birth, gender, is_member)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, phone, address, date_of_birth, gender, is_member,
                      loyalty_points, total_spent, last_visit, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.date_of_birth)
        .bind(&input.gender)
        .bind(input.is_member)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    /// Update a customer
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> AppResult<Customer> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get_customer(customer_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let email = input.email.or(existing.email);
        let phone = input.phone.or(existing.phone);
        let address = input.address.or(existing.address);
        let date_of_birth = input.date_of_birth.or(existing.date_of_birth);
        let gender = input.gender.or(existing.gender);
        let is_member = input.is_member.unwrap_or(existing.is_member);
        let status = input.status.unwrap_or(existing.status);

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $1, email = $2, phone = $3, address = $4, date_of_birth = $5,
                gender = $6, is_member = $7, status = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING id, name, email, phone, address, date_of_birth, gender, is_member,
                      loyalty_points, total_spent, last_visit, status, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&email)
        .bind(&phone)
        .bind(&address)
        .bind(date_of_birth)
        .bind(&gender)
        .bind(is_member)
        .bind(&status)
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    /// Delete a customer with no sales history
    pub async fn delete_customer(&self, customer_id: Uuid) -> AppResult<()> {
        self.get_customer(customer_id).await?;

        let sales =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_one(&self.db)
                .await?;
        if sales > 0 {
            return Err(AppError::Conflict {
                resource: "customer".to_string(),
                message: "Customer has sales history".to_string(),
                message_id: "Pelanggan memiliki riwayat penjualan".to_string(),
            });
        }

        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Per-customer purchase statistics
    pub async fn get_customer_stats(&self, customer_id: Uuid) -> AppResult<CustomerStats> {
        let customer = self.get_customer(customer_id).await?;

        let (total_purchases, total_spent) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales WHERE customer_id = $1 AND sale_status = 'completed'
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        let average_purchase = if total_purchases > 0 {
            total_spent / Decimal::from(total_purchases)
        } else {
            Decimal::ZERO
        };

        Ok(CustomerStats {
            total_purchases,
            total_spent,
            average_purchase,
            loyalty_points: customer.loyalty_points,
            last_visit: customer.last_visit,
        })
    }
}
