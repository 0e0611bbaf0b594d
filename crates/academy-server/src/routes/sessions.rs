use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::live::SessionControl;
use crate::state::AppState;

/// GET /api/sessions/:code: last published state.
pub async fn get_session(
    State(app): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let state = app
        .live
        .current(&code)
        .await
        .ok_or_else(|| AppError::not_found(format!("no live session '{code}'")))?;
    Ok(Json(serde_json::json!({
        "code": code,
        "state": state,
    })))
}

/// POST /api/sessions/:code/control: instructor command, broadcast to students.
pub async fn control_session(
    State(app): State<AppState>,
    Path(code): Path<String>,
    Json(cmd): Json<SessionControl>,
) -> Result<Json<serde_json::Value>, AppError> {
    let state = app.live.control(&code, cmd).await?;
    if !state.is_active {
        tracing::info!(session = %code, "live session ended");
    }
    Ok(Json(serde_json::json!({
        "code": code,
        "state": state,
    })))
}

#[derive(serde::Deserialize)]
pub struct HeartbeatBody {
    pub participant_id: String,
}

/// POST /api/presence/:context/heartbeat: advisory liveness ping.
pub async fn heartbeat(
    State(app): State<AppState>,
    Path(context): Path<String>,
    Json(body): Json<HeartbeatBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    academy_core::paths::validate_id(&body.participant_id)?;
    app.live.heartbeat(&context, &body.participant_id).await;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// DELETE /api/presence/:context/:participant: leave a context.
pub async fn leave(
    State(app): State<AppState>,
    Path((context, participant)): Path<(String, String)>,
) -> Json<serde_json::Value> {
    app.live.leave(&context, &participant).await;
    Json(serde_json::json!({ "ok": true }))
}

/// GET /api/presence/:context: who is online.
pub async fn get_presence(
    State(app): State<AppState>,
    Path(context): Path<String>,
) -> Json<serde_json::Value> {
    let online = app.live.online(&context).await;
    Json(serde_json::json!({
        "context": context,
        "online": online,
    }))
}
