//! Reporting service: dashboard metrics and data export

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::services::inventory::{InventoryService, MovementFilter};
use crate::services::stock::StockMovement;
use shared::types::Pagination;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Top-level dashboard metrics
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_products: i64,
    pub active_products: i64,
    pub total_stores: i64,
    pub total_warehouses: i64,
    pub today_sales: i64,
    pub today_revenue: Decimal,
    pub low_stock_items: i64,
    pub pending_transfers: i64,
    pub open_purchase_orders: i64,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Aggregate metrics for the dashboard landing page
    pub async fn get_dashboard_metrics(&self) -> AppResult<DashboardMetrics> {
        let (total_products, active_products): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM products",
        )
        .fetch_one(&self.db)
        .await?;

        let total_stores =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores WHERE status = 'active'")
                .fetch_one(&self.db)
                .await?;

        let total_warehouses = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM warehouses WHERE status = 'active'",
        )
        .fetch_one(&self.db)
        .await?;

        let (today_sales, today_revenue): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE sale_status = 'completed' AND sale_date::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let low_stock_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM warehouse_inventory WHERE min_stock > 0 AND quantity <= min_stock)
                 + (SELECT COUNT(*) FROM store_inventory WHERE min_stock > 0 AND quantity <= min_stock)
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let pending_transfers = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_transfers WHERE status = 'pending'",
        )
        .fetch_one(&self.db)
        .await?;

        let open_purchase_orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchase_orders WHERE status IN ('draft', 'pending', 'partial')",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            total_products,
            active_products,
            total_stores,
            total_warehouses,
            today_sales,
            today_revenue,
            low_stock_items,
            pending_transfers,
            open_purchase_orders,
        })
    }

    /// Movement ledger rows for export, bounded to one page of up to the
    /// maximum page size
    pub async fn get_movements_for_export(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> AppResult<Vec<StockMovement>> {
        let inventory = InventoryService::new(self.db.clone());
        let page = inventory
            .list_movements(
                MovementFilter {
                    date_from,
                    date_to,
                    ..Default::default()
                },
                Pagination {
                    page: 1,
                    per_page: 100,
                },
            )
            .await?;
        Ok(page.data)
    }

    /// Serialize rows to CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| crate::error::AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
