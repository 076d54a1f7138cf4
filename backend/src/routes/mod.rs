//! Route definitions for the Titik Kasir POS platform

use axum::{
    handler::Handler,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::api_health_check))
        // Auth routes (public login, protected profile)
        .nest("/auth", auth_routes())
        // Settings (public read, protected write)
        .route(
            "/settings",
            get(handlers::get_settings)
                .put(handlers::update_settings.layer(middleware::from_fn(auth_middleware))),
        )
        // Protected routes - user management
        .nest("/users", user_routes())
        // Protected routes - roles & permissions
        .nest("/roles", role_routes())
        .nest("/permissions", permission_routes())
        // Protected routes - master data
        .nest("/stores", store_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/customers", customer_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/discounts", discount_routes())
        // Protected routes - inventory
        .nest("/inventory", inventory_routes())
        .nest("/store-inventory", store_inventory_routes())
        // Protected routes - business events
        .nest("/sales", sale_routes())
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/stock-transfers", stock_transfer_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route(
            "/profile",
            get(handlers::get_profile).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// User management routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:user_id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Role management routes (protected)
fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_roles).post(handlers::create_role))
        .route(
            "/:role_id",
            get(handlers::get_role)
                .put(handlers::update_role)
                .delete(handlers::delete_role),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Permission catalog routes (protected)
fn permission_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_permissions))
        .route("/by-module", get(handlers::list_permissions_by_module))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Store management routes (protected)
fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stores).post(handlers::create_store))
        .route(
            "/:store_id",
            get(handlers::get_store)
                .put(handlers::update_store)
                .delete(handlers::delete_store),
        )
        .route("/:store_id/stats", get(handlers::get_store_stats))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse management routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route(
            "/:warehouse_id/inventory",
            get(handlers::get_warehouse_inventory),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Category routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer management routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route("/:customer_id/stats", get(handlers::get_customer_stats))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier management routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Discount management routes (protected)
fn discount_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_discounts).post(handlers::create_discount),
        )
        .route(
            "/:discount_id",
            get(handlers::get_discount).delete(handlers::deactivate_discount),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse inventory routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouse_inventory))
        .route("/adjust", post(handlers::adjust_warehouse_inventory))
        .route("/movements", get(handlers::list_stock_movements))
        .route("/low-stock", get(handlers::get_low_stock_report))
        .route("/out-of-stock", get(handlers::get_out_of_stock_report))
        .route(
            "/:level_id",
            get(handlers::get_warehouse_level).put(handlers::update_warehouse_level),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Store inventory routes (protected)
fn store_inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_store_inventory))
        .route("/adjust", post(handlers::adjust_store_inventory))
        .route(
            "/:level_id",
            get(handlers::get_store_level).put(handlers::update_store_level),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sales routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/stats", get(handlers::get_sales_stats))
        .route(
            "/:sale_id",
            get(handlers::get_sale).put(handlers::update_sale),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase order routes (protected)
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route("/:order_id", get(handlers::get_purchase_order))
        .route("/:order_id/receive", post(handlers::receive_purchase_order))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock transfer routes (protected)
fn stock_transfer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_stock_transfers).post(handlers::create_stock_transfer),
        )
        .route("/:transfer_id", get(handlers::get_stock_transfer))
        .route(
            "/:transfer_id/execute",
            post(handlers::execute_stock_transfer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/stock-movements", get(handlers::export_stock_movements))
        .route_layer(middleware::from_fn(auth_middleware))
}
