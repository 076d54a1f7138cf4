//! HTTP handlers for customer management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_any_permission, require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::customer::{
    CreateCustomerInput, Customer, CustomerService, CustomerStats, UpdateCustomerInput,
};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub search: Option<String>,
}

/// List customers
pub async fn list_customers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<CustomerListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<Customer>>> {
    require_any_permission(&current_user.0, &[("customers", "view"), ("pos", "view")])?;

    let service = CustomerService::new(state.db);
    let customers = service
        .list_customers(query.search, pagination.into())
        .await?;
    Ok(Json(customers))
}

/// Get a customer by id
pub async fn get_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    require_any_permission(&current_user.0, &[("customers", "view"), ("pos", "view")])?;

    let service = CustomerService::new(state.db);
    let customer = service.get_customer(customer_id).await?;
    Ok(Json(customer))
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<Customer>> {
    require_any_permission(
        &current_user.0,
        &[("customers", "create"), ("pos", "create")],
    )?;

    let service = CustomerService::new(state.db);
    let customer = service.create_customer(input).await?;
    Ok(Json(customer))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    require_permission(&current_user.0, "customers", "update")?;

    let service = CustomerService::new(state.db);
    let customer = service.update_customer(customer_id, input).await?;
    Ok(Json(customer))
}

/// Delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_permission(&current_user.0, "customers", "delete")?;

    let service = CustomerService::new(state.db);
    service.delete_customer(customer_id).await?;
    Ok(Json(()))
}

/// Per-customer purchase statistics
pub async fn get_customer_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<CustomerStats>> {
    require_any_permission(&current_user.0, &[("customers", "view"), ("pos", "view")])?;

    let service = CustomerService::new(state.db);
    let stats = service.get_customer_stats(customer_id).await?;
    Ok(Json(stats))
}
