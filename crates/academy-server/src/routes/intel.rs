use axum::extract::{Path, Query, State};
use axum::Json;

use academy_core::intel::{self, IntelBoard, IntelDrop, IntelEdit};
use academy_core::types::Priority;

use crate::error::AppError;
use crate::live::IntelReleased;
use crate::state::AppState;

#[derive(Debug, Default, serde::Deserialize)]
pub struct IntelQuery {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub admin: bool,
}

/// GET /api/intel: drops visible to a team (or everything for admins).
pub async fn list_intel(
    State(app): State<AppState>,
    Query(q): Query<IntelQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let board = IntelBoard::load(&root)?;
        let visible: Vec<&IntelDrop> = board.visible_to(q.team.as_deref(), q.admin).collect();
        Ok::<_, academy_core::AcademyError>(serde_json::json!(visible))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateIntelBody {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub target_teams: Option<Vec<String>>,
}

/// POST /api/intel: create an unreleased drop.
pub async fn create_intel(
    State(app): State<AppState>,
    Json(body): Json<CreateIntelBody>,
) -> Result<Json<IntelDrop>, AppError> {
    if body.title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    let root = app.root.clone();
    let _guard = app.store.lock().await;
    let created = tokio::task::spawn_blocking(move || {
        let mut drop = IntelDrop::new(body.title, body.body);
        drop.priority = body.priority;
        drop.target_teams = body.target_teams.filter(|t| !t.is_empty());
        intel::create(&root, drop)
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(created))
}

/// PUT /api/intel/:id: edit a drop.
pub async fn edit_intel(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<IntelEdit>,
) -> Result<Json<IntelDrop>, AppError> {
    let root = app.root.clone();
    let _guard = app.store.lock().await;
    let updated = tokio::task::spawn_blocking(move || intel::edit(&root, &id, body))
        .await
        .map_err(AppError::join)??;
    Ok(Json(updated))
}

/// POST /api/intel/:id/release: release a drop and notify subscribers.
pub async fn release_intel(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let _guard = app.store.lock().await;
    let (drop, changed) = tokio::task::spawn_blocking(move || intel::release(&root, &id))
        .await
        .map_err(AppError::join)??;

    if changed {
        app.live.publish_intel(IntelReleased::from(&drop));
    }

    Ok(Json(serde_json::json!({
        "intel": drop,
        "changed": changed,
    })))
}
