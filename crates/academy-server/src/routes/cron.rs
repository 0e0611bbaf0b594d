use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, serde::Deserialize)]
pub struct SweepQuery {
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// POST /api/cron/mastery: evaluate mastery thresholds for every participant.
pub async fn mastery_sweep(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let _guard = app.store.lock().await;
    let sweep = tokio::task::spawn_blocking(move || academy_core::sweep::run_mastery_sweep(&root))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::to_value(sweep)?))
}

/// POST /api/cron/recognition: grant recognition awards as of today.
pub async fn recognition_sweep(
    State(app): State<AppState>,
    Query(q): Query<SweepQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let today = super::effective_date(q.as_of);
    let _guard = app.store.lock().await;
    let sweep = tokio::task::spawn_blocking(move || {
        let config = academy_core::config::Config::load(&root)?;
        academy_core::sweep::run_recognition_sweep(&root, config.program_day(today))
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(serde_json::to_value(sweep)?))
}
