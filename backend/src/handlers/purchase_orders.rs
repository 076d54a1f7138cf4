//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::purchase_order::{
    CreatePurchaseOrderInput, PurchaseOrder, PurchaseOrderFilter, PurchaseOrderService,
    PurchaseOrderWithItems, ReceivePurchaseOrderInput,
};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct PurchaseOrderListQuery {
    pub status: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

/// List purchase orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PurchaseOrderListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<PurchaseOrder>>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = PurchaseOrderService::new(state.db);
    let orders = service
        .list_orders(
            PurchaseOrderFilter {
                status: query.status,
                warehouse_id: query.warehouse_id,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(orders))
}

/// Get a purchase order with items
pub async fn get_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrderWithItems>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = PurchaseOrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrderWithItems>> {
    require_permission(&current_user.0, "inventory", "create")?;

    let service = PurchaseOrderService::new(state.db);
    let order = service.create_order(current_user.0.user_id, input).await?;
    Ok(Json(order))
}

/// Receive goods against a purchase order
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceivePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrderWithItems>> {
    require_permission(&current_user.0, "inventory", "update")?;

    let service = PurchaseOrderService::new(state.db);
    let order = service
        .receive_order(current_user.0.user_id, order_id, input)
        .await?;
    Ok(Json(order))
}
