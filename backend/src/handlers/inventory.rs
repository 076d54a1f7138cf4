//! HTTP handlers for inventory endpoints: stock levels, manual
//! adjustments, the movement ledger, and the low-stock report

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_any_permission, require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    AdjustStockInput, InventoryService, LevelFilter, LowStockRow, MovementFilter, StoreLevel,
    UpdateStoreLevelInput, UpdateWarehouseLevelInput, WarehouseLevel,
};
use crate::services::stock::{AppliedMovement, StockMovement};
use crate::models::LocationRef;
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct InventoryListQuery {
    pub search: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementListQuery {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Adjustment request carrying the target location id
#[derive(Debug, Deserialize)]
pub struct AdjustWarehouseStockRequest {
    pub warehouse_id: Uuid,
    #[serde(flatten)]
    pub input: AdjustStockInput,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStoreStockRequest {
    pub store_id: Uuid,
    #[serde(flatten)]
    pub input: AdjustStockInput,
}

/// List warehouse stock levels
pub async fn list_warehouse_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<InventoryListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<WarehouseLevel>>> {
    require_any_permission(&current_user.0, &[("inventory", "view"), ("pos", "view")])?;

    let service = InventoryService::new(state.db);
    let levels = service
        .list_warehouse_levels(
            LevelFilter {
                search: query.search,
                warehouse_id: query.warehouse_id,
                store_id: None,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(levels))
}

/// Get one warehouse stock level
pub async fn get_warehouse_level(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(level_id): Path<Uuid>,
) -> AppResult<Json<WarehouseLevel>> {
    require_any_permission(&current_user.0, &[("inventory", "view"), ("pos", "view")])?;

    let service = InventoryService::new(state.db);
    let level = service.get_warehouse_level(level_id).await?;
    Ok(Json(level))
}

/// Update warehouse level metadata/thresholds
pub async fn update_warehouse_level(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(level_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseLevelInput>,
) -> AppResult<Json<WarehouseLevel>> {
    require_permission(&current_user.0, "inventory", "update")?;

    let service = InventoryService::new(state.db);
    let level = service.update_warehouse_level(level_id, input).await?;
    Ok(Json(level))
}

/// Manually adjust a warehouse stock level
pub async fn adjust_warehouse_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<AdjustWarehouseStockRequest>,
) -> AppResult<Json<AppliedMovement>> {
    require_permission(&current_user.0, "inventory", "update")?;

    let service = InventoryService::new(state.db);
    let applied = service
        .adjust_level(
            current_user.0.user_id,
            LocationRef::warehouse(request.warehouse_id),
            request.input,
        )
        .await?;
    Ok(Json(applied))
}

/// List store stock levels
pub async fn list_store_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<InventoryListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<StoreLevel>>> {
    require_any_permission(&current_user.0, &[("inventory", "view"), ("pos", "view")])?;

    let service = InventoryService::new(state.db);
    let levels = service
        .list_store_levels(
            LevelFilter {
                search: query.search,
                warehouse_id: None,
                store_id: query.store_id,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(levels))
}

/// Get one store stock level
pub async fn get_store_level(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(level_id): Path<Uuid>,
) -> AppResult<Json<StoreLevel>> {
    require_any_permission(&current_user.0, &[("inventory", "view"), ("pos", "view")])?;

    let service = InventoryService::new(state.db);
    let level = service.get_store_level(level_id).await?;
    Ok(Json(level))
}

/// Update store level metadata/thresholds
pub async fn update_store_level(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(level_id): Path<Uuid>,
    Json(input): Json<UpdateStoreLevelInput>,
) -> AppResult<Json<StoreLevel>> {
    require_permission(&current_user.0, "inventory", "update")?;

    let service = InventoryService::new(state.db);
    let level = service.update_store_level(level_id, input).await?;
    Ok(Json(level))
}

/// Manually adjust a store stock level
pub async fn adjust_store_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<AdjustStoreStockRequest>,
) -> AppResult<Json<AppliedMovement>> {
    require_permission(&current_user.0, "inventory", "update")?;

    let service = InventoryService::new(state.db);
    let applied = service
        .adjust_level(
            current_user.0.user_id,
            LocationRef::store(request.store_id),
            request.input,
        )
        .await?;
    Ok(Json(applied))
}

/// List movement ledger entries
pub async fn list_stock_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<MovementListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<StockMovement>>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = InventoryService::new(state.db);
    let movements = service
        .list_movements(
            MovementFilter {
                product_id: query.product_id,
                warehouse_id: query.warehouse_id,
                store_id: query.store_id,
                date_from: query.date_from,
                date_to: query.date_to,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(movements))
}

/// Low-stock report across warehouses and stores
pub async fn get_low_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockRow>>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = InventoryService::new(state.db);
    let rows = service.low_stock_report().await?;
    Ok(Json(rows))
}

/// Out-of-stock report across warehouses and stores
pub async fn get_out_of_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockRow>>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = InventoryService::new(state.db);
    let rows = service.out_of_stock_report().await?;
    Ok(Json(rows))
}
