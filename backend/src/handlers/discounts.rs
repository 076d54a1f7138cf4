//! HTTP handlers for discount management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_any_permission, require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::discount::{CreateDiscountInput, Discount, DiscountService};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct DiscountListQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// List discounts
pub async fn list_discounts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DiscountListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<Discount>>> {
    require_any_permission(&current_user.0, &[("discounts", "view"), ("pos", "view")])?;

    let service = DiscountService::new(state.db);
    let discounts = service
        .list_discounts(query.active_only, pagination.into())
        .await?;
    Ok(Json(discounts))
}

/// Get a discount by id
pub async fn get_discount(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(discount_id): Path<Uuid>,
) -> AppResult<Json<Discount>> {
    require_any_permission(&current_user.0, &[("discounts", "view"), ("pos", "view")])?;

    let service = DiscountService::new(state.db);
    let discount = service.get_discount(discount_id).await?;
    Ok(Json(discount))
}

/// Create a discount
pub async fn create_discount(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDiscountInput>,
) -> AppResult<Json<Discount>> {
    require_permission(&current_user.0, "discounts", "create")?;

    let service = DiscountService::new(state.db);
    let discount = service
        .create_discount(current_user.0.user_id, input)
        .await?;
    Ok(Json(discount))
}

/// Deactivate a discount
pub async fn deactivate_discount(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(discount_id): Path<Uuid>,
) -> AppResult<Json<Discount>> {
    require_permission(&current_user.0, "discounts", "delete")?;

    let service = DiscountService::new(state.db);
    let discount = service.deactivate_discount(discount_id).await?;
    Ok(Json(discount))
}
