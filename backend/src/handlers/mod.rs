//! HTTP handlers for the Titik Kasir POS platform

pub mod auth;
pub mod customers;
pub mod discounts;
pub mod health;
pub mod inventory;
pub mod products;
pub mod purchase_orders;
pub mod reporting;
pub mod roles;
pub mod sales;
pub mod settings;
pub mod stock_transfers;
pub mod stores;
pub mod suppliers;
pub mod users;
pub mod warehouses;

pub use auth::*;
pub use customers::*;
pub use discounts::*;
pub use health::*;
pub use inventory::*;
pub use products::*;
pub use purchase_orders::*;
pub use reporting::*;
pub use roles::*;
pub use sales::*;
pub use settings::*;
pub use stock_transfers::*;
pub use stores::*;
pub use suppliers::*;
pub use users::*;
pub use warehouses::*;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::types::Pagination;

/// Common pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        let default = Pagination::default();
        Pagination {
            page: query.page.unwrap_or(default.page),
            per_page: query.per_page.unwrap_or(default.per_page),
        }
    }
}

/// Reject the request unless the user holds `resource:action`
pub(crate) fn require_permission(user: &AuthUser, resource: &str, action: &str) -> AppResult<()> {
    if user.has_permission(resource, action) {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}

/// Reject the request unless the user holds any of the given permissions
pub(crate) fn require_any_permission(user: &AuthUser, perms: &[(&str, &str)]) -> AppResult<()> {
    if user.has_any_permission(perms) {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}
