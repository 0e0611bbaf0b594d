use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;

use academy_core::config::Config;
use academy_core::roster::Roster;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, serde::Deserialize)]
pub struct ReadinessQuery {
    /// Previous overall figure, for the trend.
    #[serde(default)]
    pub previous: Option<u32>,
    #[serde(default)]
    pub task_force: Option<String>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// GET /api/readiness: program-wide (or one task force's) readiness.
pub async fn get_readiness(
    State(app): State<AppState>,
    Query(q): Query<ReadinessQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let today = super::effective_date(q.as_of);
    let result = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let roster = Roster::load(&root)?;
        let members: Vec<_> = roster
            .in_task_force(q.task_force.as_deref())
            .map(|p| p.mastery())
            .collect();
        let readiness =
            academy_core::readiness::compute(&members, q.previous, config.program_day(today));
        Ok::<_, academy_core::AcademyError>(serde_json::json!({
            "task_force": q.task_force,
            "readiness": readiness,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// GET /api/readiness/task-forces: readiness for each task force.
pub async fn get_task_force_readiness(
    State(app): State<AppState>,
    Query(q): Query<ReadinessQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let today = super::effective_date(q.as_of);
    let result = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let roster = Roster::load(&root)?;
        let forces = academy_core::readiness::readiness_by_task_force(
            &roster.participants,
            config.program_day(today),
        );
        Ok::<_, academy_core::AcademyError>(serde_json::json!(forces))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub task_force: Option<String>,
}

/// GET /api/leaderboard: ranked participants.
pub async fn get_leaderboard(
    State(app): State<AppState>,
    Query(q): Query<LeaderboardQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let roster = Roster::load(&root)?;
        let board = academy_core::leaderboard::rank(roster.in_task_force(q.task_force.as_deref()));
        Ok::<_, academy_core::AcademyError>(serde_json::json!(board))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}
