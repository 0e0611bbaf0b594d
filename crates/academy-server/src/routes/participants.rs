use axum::extract::{Path, State};
use axum::Json;

use academy_core::mastery;
use academy_core::notice::NoticeLog;
use academy_core::roster::{Activity, Roster};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/participants: roster summary.
pub async fn list_participants(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let roster = Roster::load(&root)?;
        let list: Vec<serde_json::Value> = roster
            .participants
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "role": p.role,
                    "task_force": p.task_force,
                    "mastery_level": p.mastery_level,
                    "clearance": p.clearance(),
                    "days_completed": p.days_completed,
                })
            })
            .collect();
        Ok::<_, academy_core::AcademyError>(serde_json::json!(list))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// GET /api/participants/:id: full participant record with notices.
pub async fn get_participant(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let roster = Roster::load(&root)?;
        let p = roster.get(&id)?;
        let notices = NoticeLog::load(&root)?;
        let mine: Vec<_> = notices.for_participant(&id).collect();
        Ok::<_, academy_core::AcademyError>(serde_json::json!({
            "participant": p,
            "clearance": p.clearance(),
            "notices": mine,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct ActivityBody {
    pub activity: Activity,
}

/// POST /api/participants/:id/activity: record an activity and run the
/// mastery check for that participant in the same store update.
pub async fn record_activity(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ActivityBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let _guard = app.store.lock().await;
    let result = tokio::task::spawn_blocking(move || {
        let (p, level_up) = mastery::record_activity(&root, &id, body.activity, 1)?;
        Ok::<_, academy_core::AcademyError>(serde_json::json!({
            "id": p.id,
            "counters": p.counters(),
            "clearance": p.clearance(),
            "level_up": level_up,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}
