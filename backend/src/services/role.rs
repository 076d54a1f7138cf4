//! Role and permission management service
//!
//! Permissions are a fixed catalog of `resource:action` pairs seeded by
//! migration; roles are named bundles of permissions. System roles cannot
//! be renamed or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Role service
#[derive(Clone)]
pub struct RoleService {
    db: PgPool,
}

/// Role record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permission record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
}

/// Role with its assigned permissions
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Permissions grouped by resource module
#[derive(Debug, Clone, Serialize)]
pub struct PermissionModule {
    pub resource: String,
    pub permissions: Vec<Permission>,
}

/// Input for creating a role
#[derive(Debug, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

/// Input for updating a role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<Uuid>>,
}

impl RoleService {
    /// Create a new RoleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all roles
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, is_system_role, created_at, updated_at
            FROM roles ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }

    /// Get a role with its permissions
    pub async fn get_role(&self, role_id: Uuid) -> AppResult<RoleWithPermissions> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, is_system_role, created_at, updated_at
            FROM roles WHERE id = $1
            "#,
        )
        .bind(role_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.resource, p.action, p.description
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.resource, p.action
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RoleWithPermissions { role, permissions })
    }

    /// Create a role with an initial permission set
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleWithPermissions> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Role name cannot be empty".to_string(),
                message_id: "Nama peran tidak boleh kosong".to_string(),
            });
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM roles WHERE LOWER(name) = LOWER($1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;
        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: "Role with this name already exists".to_string(),
                message_id: "Peran dengan nama ini sudah ada".to_string(),
            });
        }

        self.validate_permission_ids(&input.permission_ids).await?;

        let mut tx = self.db.begin().await?;

        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO roles (name, description, is_system_role)
            VALUES ($1, $2, false)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        for permission_id in &input.permission_ids {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
                .bind(role_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_role(role_id).await
    }

    /// Update a role; system roles keep their name
    pub async fn update_role(
        &self,
        role_id: Uuid,
        input: UpdateRoleInput,
    ) -> AppResult<RoleWithPermissions> {
        let existing = self.get_role(role_id).await?;

        if existing.role.is_system_role && input.name.is_some() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "System roles cannot be renamed".to_string(),
                message_id: "Peran sistem tidak dapat diganti namanya".to_string(),
            });
        }

        if let Some(ref ids) = input.permission_ids {
            self.validate_permission_ids(ids).await?;
        }

        let name = input.name.unwrap_or(existing.role.name);
        let description = input.description.or(existing.role.description);

        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE roles SET name = $1, description = $2, updated_at = NOW() WHERE id = $3")
            .bind(&name)
            .bind(&description)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        if let Some(permission_ids) = input.permission_ids {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                .bind(role_id)
                .execute(&mut *tx)
                .await?;

            for permission_id in &permission_ids {
                sqlx::query(
                    "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)",
                )
                .bind(role_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get_role(role_id).await
    }

    /// Delete a non-system role that has no users
    pub async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        let role = self.get_role(role_id).await?;
        if role.role.is_system_role {
            return Err(AppError::Validation {
                field: "role".to_string(),
                message: "System roles cannot be deleted".to_string(),
                message_id: "Peran sistem tidak dapat dihapus".to_string(),
            });
        }

        let users = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role_id = $1 AND deleted_at IS NULL",
        )
        .bind(role_id)
        .fetch_one(&self.db)
        .await?;
        if users > 0 {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: "Role is still assigned to users".to_string(),
                message_id: "Peran masih digunakan oleh pengguna".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    /// List the full permission catalog
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, resource, action, description FROM permissions ORDER BY resource, action",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    /// Permission catalog grouped by resource
    pub async fn list_permissions_by_module(&self) -> AppResult<Vec<PermissionModule>> {
        let permissions = self.list_permissions().await?;

        let mut modules: Vec<PermissionModule> = Vec::new();
        for permission in permissions {
            match modules.last_mut() {
                Some(module) if module.resource == permission.resource => {
                    module.permissions.push(permission);
                }
                _ => modules.push(PermissionModule {
                    resource: permission.resource.clone(),
                    permissions: vec![permission],
                }),
            }
        }

        Ok(modules)
    }

    async fn validate_permission_ids(&self, ids: &[Uuid]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let valid_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM permissions WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(&self.db)
                .await?;

        if valid_count != ids.len() as i64 {
            return Err(AppError::Validation {
                field: "permission_ids".to_string(),
                message: "One or more permission IDs are invalid".to_string(),
                message_id: "Satu atau lebih ID izin tidak valid".to_string(),
            });
        }
        Ok(())
    }
}
