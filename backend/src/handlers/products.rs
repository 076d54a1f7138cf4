//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{require_any_permission, require_permission, PaginationQuery};
use crate::middleware::CurrentUser;
use crate::services::product::{
    Category, CategoryInput, CreateProductInput, Product, ProductFilter, ProductService,
    ProductWithVariants, UpdateProductInput,
};
use crate::AppState;
use shared::types::PaginatedResponse;

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// List products (POS cashiers may read the catalog)
pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ProductListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    require_any_permission(&current_user.0, &[("products", "view"), ("pos", "view")])?;

    let service = ProductService::new(state.db);
    let products = service
        .list_products(
            ProductFilter {
                search: query.search,
                category_id: query.category_id,
                is_active: query.is_active,
            },
            pagination.into(),
        )
        .await?;
    Ok(Json(products))
}

/// Get a product with variants
pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductWithVariants>> {
    require_any_permission(&current_user.0, &[("products", "view"), ("pos", "view")])?;

    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<ProductWithVariants>> {
    require_permission(&current_user.0, "products", "create")?;

    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductWithVariants>> {
    require_permission(&current_user.0, "products", "update")?;

    let service = ProductService::new(state.db);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Deactivate a product
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_permission(&current_user.0, "products", "delete")?;

    let service = ProductService::new(state.db);
    service.delete_product(product_id).await?;
    Ok(Json(()))
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    require_any_permission(&current_user.0, &[("products", "view"), ("pos", "view")])?;

    let service = ProductService::new(state.db);
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Get a category
pub async fn get_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    require_any_permission(&current_user.0, &[("products", "view"), ("pos", "view")])?;

    let service = ProductService::new(state.db);
    let category = service.get_category(category_id).await?;
    Ok(Json(category))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    require_permission(&current_user.0, "products", "create")?;

    let service = ProductService::new(state.db);
    let category = service.create_category(input).await?;
    Ok(Json(category))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    require_permission(&current_user.0, "products", "update")?;

    let service = ProductService::new(state.db);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_permission(&current_user.0, "products", "delete")?;

    let service = ProductService::new(state.db);
    service.delete_category(category_id).await?;
    Ok(Json(()))
}
