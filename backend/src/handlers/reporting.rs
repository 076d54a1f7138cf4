//! Reporting handlers for dashboard metrics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::require_permission;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardMetrics, ReportingService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MovementExportQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// "json" or "csv"
    pub format: Option<String>,
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    require_permission(&current_user.0, "reports", "view")?;

    let service = ReportingService::new(state.db.clone());
    let metrics = service.get_dashboard_metrics().await?;
    Ok(Json(metrics))
}

/// Export movement ledger entries, as JSON or CSV
pub async fn export_stock_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<MovementExportQuery>,
) -> AppResult<impl IntoResponse> {
    require_permission(&current_user.0, "reports", "view")?;

    let service = ReportingService::new(state.db.clone());
    let movements = service
        .get_movements_for_export(query.date_from, query.date_to)
        .await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&movements)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"stock_movements.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(movements).into_response())
    }
}
