use axum::extract::{Path, Query, State};
use axum::Json;

use academy_core::config::Config;
use academy_core::content::BriefingResolver;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, serde::Deserialize)]
pub struct BriefingQuery {
    #[serde(default)]
    pub admin: bool,
}

/// GET /api/briefings/:day: briefing text, served from cache when fresh.
pub async fn get_briefing(
    State(app): State<AppState>,
    Path(day): Path<u32>,
    Query(q): Query<BriefingQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cached = app.briefings.lock().map_err(poisoned)?.get(day, q.admin);
    if let Some(hit) = cached {
        return Ok(Json(serde_json::json!({
            "day": hit.day,
            "admin": hit.admin,
            "source": hit.source,
            "body": hit.body,
            "cached": true,
        })));
    }
    tracing::debug!(day, admin = q.admin, "briefing cache miss");

    let root = app.root.clone();
    let admin = q.admin;
    let briefing = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        config.validate_day(day)?;
        BriefingResolver::from_config(&root, &config).resolve(day, admin)
    })
    .await
    .map_err(AppError::join)??;

    app.briefings
        .lock()
        .map_err(poisoned)?
        .insert(briefing.clone(), q.admin);

    Ok(Json(serde_json::json!({
        "day": briefing.day,
        "admin": briefing.admin,
        "source": briefing.source,
        "body": briefing.body,
        "cached": false,
    })))
}

/// DELETE /api/briefings/cache: drop every cached briefing.
pub async fn clear_cache(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let cleared = {
        let mut cache = app.briefings.lock().map_err(poisoned)?;
        let n = cache.len();
        cache.clear();
        n
    };
    tracing::info!(cleared, "briefing cache cleared");
    Ok(Json(serde_json::json!({ "cleared": cleared })))
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> AppError {
    AppError(anyhow::anyhow!("briefing cache lock poisoned"))
}
