//! HTTP handlers for settings endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::handlers::require_permission;
use crate::middleware::CurrentUser;
use crate::services::settings::{Setting, SettingsService, UpdateSettingsInput};
use crate::AppState;

/// List settings (public: the POS frontend reads these before login)
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Vec<Setting>>> {
    let service = SettingsService::new(state.db);
    let settings = service.list_settings().await?;
    Ok(Json(settings))
}

/// Upsert settings
pub async fn update_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateSettingsInput>,
) -> AppResult<Json<Vec<Setting>>> {
    require_permission(&current_user.0, "settings", "update")?;

    let service = SettingsService::new(state.db);
    let settings = service.update_settings(input).await?;
    Ok(Json(settings))
}
