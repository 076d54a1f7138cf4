//! Key-value settings service
//!
//! Operational knobs read at runtime, e.g. the loyalty earn threshold
//! (`loyalty_min_purchase`) consulted during checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

/// Settings service
#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
}

/// One setting
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Input for upserting settings
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsInput {
    pub settings: Vec<SettingInput>,
}

#[derive(Debug, Deserialize)]
pub struct SettingInput {
    pub key: String,
    pub value: String,
}

impl SettingsService {
    /// Create a new SettingsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all settings
    pub async fn list_settings(&self) -> AppResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(settings)
    }

    /// Upsert a batch of settings
    pub async fn update_settings(&self, input: UpdateSettingsInput) -> AppResult<Vec<Setting>> {
        for setting in &input.settings {
            if setting.key.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Setting key cannot be empty".to_string(),
                ));
            }
        }

        let mut tx = self.db.begin().await?;
        for setting in &input.settings {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value) VALUES ($1, $2)
                ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                "#,
            )
            .bind(&setting.key)
            .bind(&setting.value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        self.list_settings().await
    }
}
