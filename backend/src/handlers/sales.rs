//! HTTP handlers for sales endpoints
//!
//! Users assigned to a store only see that store's sales; back-office
//! users may filter by any store.

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
use crate::services::sale::{
    CreateSaleInput, Sale, SaleFilter, SaleService, SaleWithDetails, SalesStats, UpdateSaleInput,
};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub store_id: Option<Uuid>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleStatsQuery {
    pub store_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SaleListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<Sale>>> {
    require_any_permission(&current_user.0, &[("sales", "view"), ("pos", "view")])?;

    // Store-assigned users are pinned to their own store
    let store_id = current_user.0.store_id.or(query.store_id);

    let service = SaleService::new(state.db);
    let sales = service
        .list_sales(
            SaleFilter {
                store_id,
                status: query.status,
                search: query.search,
                date_from: query.date_from,
                date_to: query.date_to,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(sales))
}

/// Get a sale with items and payments
pub async fn get_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleWithDetails>> {
    require_any_permission(&current_user.0, &[("sales", "view"), ("pos", "view")])?;

    let service = SaleService::new(state.db);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// Create a sale (POS checkout)
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<SaleWithDetails>> {
    require_any_permission(&current_user.0, &[("sales", "create"), ("pos", "create")])?;

    let service = SaleService::new(state.db);
    let sale = service.create_sale(current_user.0.user_id, input).await?;
    Ok(Json(sale))
}

/// Update a draft sale
pub async fn update_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<Sale>> {
    require_permission(&current_user.0, "sales", "update")?;

    let service = SaleService::new(state.db);
    let sale = service.update_sale(sale_id, input).await?;
    Ok(Json(sale))
}

/// Sales statistics
pub async fn get_sales_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SaleStatsQuery>,
) -> AppResult<Json<SalesStats>> {
    require_any_permission(&current_user.0, &[("sales", "view"), ("pos", "view")])?;

    let store_id = current_user.0.store_id.or(query.store_id);

    let service = SaleService::new(state.db);
    let stats = service
        .get_stats(store_id, query.date_from, query.date_to)
        .await?;
    Ok(Json(stats))
}
