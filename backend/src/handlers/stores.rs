//! HTTP handlers for store management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_any_permission, require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::store::{CreateStoreInput, Store, StoreService, StoreStats, UpdateStoreInput};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct StoreListQuery {
    pub search: Option<String>,
}

/// List stores (POS cashiers may read the store list)
pub async fn list_stores(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StoreListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<Store>>> {
    require_any_permission(&current_user.0, &[("stores", "view"), ("pos", "view")])?;

    let service = StoreService::new(state.db);
    let stores = service.list_stores(query.search, pagination.into()).await?;
    Ok(Json(stores))
}

/// Get a store by id
pub async fn get_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Store>> {
    require_any_permission(&current_user.0, &[("stores", "view"), ("pos", "view")])?;

    let service = StoreService::new(state.db);
    let store = service.get_store(store_id).await?;
    Ok(Json(store))
}

/// Create a store
pub async fn create_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStoreInput>,
) -> AppResult<Json<Store>> {
    require_permission(&current_user.0, "stores", "create")?;

    let service = StoreService::new(state.db);
    let store = service.create_store(input).await?;
    Ok(Json(store))
}

/// Update a store
pub async fn update_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
    Json(input): Json<UpdateStoreInput>,
) -> AppResult<Json<Store>> {
    require_permission(&current_user.0, "stores", "update")?;

    let service = StoreService::new(state.db);
    let store = service.update_store(store_id, input).await?;
    Ok(Json(store))
}

/// Delete a store
pub async fn delete_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_permission(&current_user.0, "stores", "delete")?;

    let service = StoreService::new(state.db);
    service.delete_store(store_id).await?;
    Ok(Json(()))
}

/// Store sales/stock statistics
pub async fn get_store_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<StoreStats>> {
    require_any_permission(&current_user.0, &[("stores", "view"), ("pos", "view")])?;

    let service = StoreService::new(state.db);
    let stats = service.get_store_stats(store_id).await?;
    Ok(Json(stats))
}
