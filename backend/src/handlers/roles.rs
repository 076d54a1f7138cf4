//! HTTP handlers for role and permission management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::require_permission;
use crate::middleware::CurrentUser;
use crate::services::role::{
    CreateRoleInput, Permission, PermissionModule, Role, RoleService, RoleWithPermissions,
    UpdateRoleInput,
};
use crate::AppState;

/// List all roles
pub async fn list_roles(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Role>>> {
    require_permission(&current_user.0, "roles", "view")?;

    let service = RoleService::new(state.db);
    let roles = service.list_roles().await?;
    Ok(Json(roles))
}

/// Get a role with permissions
pub async fn get_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<RoleWithPermissions>> {
    require_permission(&current_user.0, "roles", "view")?;

    let service = RoleService::new(state.db);
    let role = service.get_role(role_id).await?;
    Ok(Json(role))
}

/// Create a role
pub async fn create_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateRoleInput>,
) -> AppResult<Json<RoleWithPermissions>> {
    require_permission(&current_user.0, "roles", "create")?;

    let service = RoleService::new(state.db);
    let role = service.create_role(input).await?;
    Ok(Json(role))
}

/// Update a role
pub async fn update_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(role_id): Path<Uuid>,
    Json(input): Json<UpdateRoleInput>,
) -> AppResult<Json<RoleWithPermissions>> {
    require_permission(&current_user.0, "roles", "update")?;

    let service = RoleService::new(state.db);
    let role = service.update_role(role_id, input).await?;
    Ok(Json(role))
}

/// Delete a role
pub async fn delete_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_permission(&current_user.0, "roles", "delete")?;

    let service = RoleService::new(state.db);
    service.delete_role(role_id).await?;
    Ok(Json(()))
}

/// List the permission catalog
pub async fn list_permissions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Permission>>> {
    require_permission(&current_user.0, "permissions", "view")?;

    let service = RoleService::new(state.db);
    let permissions = service.list_permissions().await?;
    Ok(Json(permissions))
}

/// Permission catalog grouped by module
pub async fn list_permissions_by_module(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PermissionModule>>> {
    require_permission(&current_user.0, "permissions", "view")?;

    let service = RoleService::new(state.db);
    let modules = service.list_permissions_by_module().await?;
    Ok(Json(modules))
}
