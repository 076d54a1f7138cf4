//! User management service

use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, Pagination};

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// User record (password hash never serialized)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub role_id: Uuid,
    pub store_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub full_name: Option<String>,
    pub role_id: Uuid,
    pub store_id: Option<Uuid>,
}

/// Input for updating a user
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Filter for user listings
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role_id: Option<Uuid>,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List users
    pub async fn list_users(
        &self,
        filter: UserFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<User>> {
        let pagination = pagination.normalized();
        let search = filter.search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR username ILIKE $1 OR email ILIKE $1 OR full_name ILIKE $1)
              AND ($2::uuid IS NULL OR role_id = $2)
            "#,
        )
        .bind(&search)
        .bind(filter.role_id)
        .fetch_one(&self.db)
        .await?;

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, is_active, role_id, store_id,
                   created_at, updated_at
            FROM users
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR username ILIKE $1 OR email ILIKE $1 OR full_name ILIKE $1)
              AND ($2::uuid IS NULL OR role_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&search)
        .bind(filter.role_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(users, pagination, total as u64))
    }

    /// Get a user by id
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, is_active, role_id, store_id,
                   created_at, updated_at
            FROM users WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Create a user
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE (username = $1 OR email = $2) AND deleted_at IS NULL",
        )
        .bind(&input.username)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("username or email".to_string()));
        }

        let role_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
                .bind(input.role_id)
                .fetch_one(&self.db)
                .await?;
        if !role_exists {
            return Err(AppError::NotFound("Role".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, role_id, store_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, full_name, is_active, role_id, store_id,
                      created_at, updated_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.full_name)
        .bind(input.role_id)
        .bind(input.store_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user created");

        Ok(user)
    }

    /// Update a user
    pub async fn update_user(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get_user(user_id).await?;

        if let Some(ref email) = input.email {
            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE email = $1 AND id <> $2 AND deleted_at IS NULL",
            )
            .bind(email)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
            if duplicate > 0 {
                return Err(AppError::DuplicateEntry("email".to_string()));
            }
        }

        let password_hash = match &input.password {
            Some(password) => Some(
                hash(password, DEFAULT_COST)
                    .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?,
            ),
            None => None,
        };

        let email = input.email.unwrap_or(existing.email);
        let full_name = input.full_name.or(existing.full_name);
        let role_id = input.role_id.unwrap_or(existing.role_id);
        let store_id = input.store_id.or(existing.store_id);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $1,
                password_hash = COALESCE($2, password_hash),
                full_name = $3,
                role_id = $4,
                store_id = $5,
                is_active = $6,
                updated_at = NOW()
            WHERE id = $7
            RETURNING id, username, email, full_name, is_active, role_id, store_id,
                      created_at, updated_at
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(&full_name)
        .bind(role_id)
        .bind(store_id)
        .bind(is_active)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// Soft-delete a user
    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }
        Ok(())
    }
}
