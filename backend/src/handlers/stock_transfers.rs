//! HTTP handlers for stock transfer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::stock_transfer::{
    CreateTransferInput, StockTransfer, StockTransferService, StockTransferWithItems,
    TransferFilter,
};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct TransferListQuery {
    pub status: Option<String>,
}

/// List stock transfers
pub async fn list_stock_transfers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TransferListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<StockTransfer>>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = StockTransferService::new(state.db);
    let transfers = service
        .list_transfers(
            TransferFilter {
                status: query.status,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(transfers))
}

/// Get a stock transfer with items
pub async fn get_stock_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<StockTransferWithItems>> {
    require_permission(&current_user.0, "inventory", "view")?;

    let service = StockTransferService::new(state.db);
    let transfer = service.get_transfer(transfer_id).await?;
    Ok(Json(transfer))
}

/// Create a pending stock transfer
pub async fn create_stock_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<Json<StockTransferWithItems>> {
    require_permission(&current_user.0, "inventory", "create")?;

    let service = StockTransferService::new(state.db);
    let transfer = service
        .create_transfer(current_user.0.user_id, input)
        .await?;
    Ok(Json(transfer))
}

/// Execute a pending stock transfer
pub async fn execute_stock_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<StockTransferWithItems>> {
    require_permission(&current_user.0, "inventory", "update")?;

    let service = StockTransferService::new(state.db);
    let transfer = service
        .execute_transfer(current_user.0.user_id, transfer_id)
        .await?;
    Ok(Json(transfer))
}
