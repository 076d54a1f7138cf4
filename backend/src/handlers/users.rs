//! HTTP handlers for user management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::user::{CreateUserInput, UpdateUserInput, User, UserFilter, UserService};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role_id: Option<Uuid>,
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<UserListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    require_permission(&current_user.0, "users", "view")?;

    let service = UserService::new(state.db);
    let users = service
        .list_users(
            UserFilter {
                search: query.search,
                role_id: query.role_id,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(users))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    require_permission(&current_user.0, "users", "view")?;

    let service = UserService::new(state.db);
    let user = service.get_user(user_id).await?;
    Ok(Json(user))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<User>> {
    require_permission(&current_user.0, "users", "create")?;

    let service = UserService::new(state.db);
    let user = service.create_user(input).await?;
    Ok(Json(user))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    require_permission(&current_user.0, "users", "update")?;

    let service = UserService::new(state.db);
    let user = service.update_user(user_id, input).await?;
    Ok(Json(user))
}

/// Soft-delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_permission(&current_user.0, "users", "delete")?;

    let service = UserService::new(state.db);
    service.delete_user(user_id).await?;
    Ok(Json(()))
}
