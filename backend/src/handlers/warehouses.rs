//! HTTP handlers for warehouse management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::inventory::{InventoryService, LevelFilter, WarehouseLevel};
use crate::services::warehouse::{
    CreateWarehouseInput, UpdateWarehouseInput, Warehouse, WarehouseService,
};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct WarehouseListQuery {
    pub search: Option<String>,
}

/// List warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<WarehouseListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<Warehouse>>> {
    require_permission(&current_user.0, "warehouses", "view")?;

    let service = WarehouseService::new(state.db);
    let warehouses = service
        .list_warehouses(query.search, pagination.into())
        .await?;
    Ok(Json(warehouses))
}

/// Get a warehouse by id
pub async fn get_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    require_permission(&current_user.0, "warehouses", "view")?;

    let service = WarehouseService::new(state.db);
    let warehouse = service.get_warehouse(warehouse_id).await?;
    Ok(Json(warehouse))
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    require_permission(&current_user.0, "warehouses", "create")?;

    let service = WarehouseService::new(state.db);
    let warehouse = service.create_warehouse(input).await?;
    Ok(Json(warehouse))
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    require_permission(&current_user.0, "warehouses", "update")?;

    let service = WarehouseService::new(state.db);
    let warehouse = service.update_warehouse(warehouse_id, input).await?;
    Ok(Json(warehouse))
}

/// Delete a warehouse
pub async fn delete_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_permission(&current_user.0, "warehouses", "delete")?;

    let service = WarehouseService::new(state.db);
    service.delete_warehouse(warehouse_id).await?;
    Ok(Json(()))
}

/// Stock levels held at one warehouse
pub async fn get_warehouse_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<WarehouseLevel>>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = InventoryService::new(state.db);
    let levels = service
        .list_warehouse_levels(
            LevelFilter {
                warehouse_id: Some(warehouse_id),
                ..Default::default()
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(levels))
}
