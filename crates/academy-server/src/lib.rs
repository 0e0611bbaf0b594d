pub mod auth;
pub mod error;
pub mod live;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    build_router_with_state(state::AppState::new(root))
}

/// Build the router around an existing state. Tests use this to inject a
/// cron secret without touching the process environment.
pub fn build_router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Scheduled jobs; every route here requires the cron bearer secret.
    let cron = Router::new()
        .route("/api/cron/mastery", post(routes::cron::mastery_sweep))
        .route(
            "/api/cron/recognition",
            post(routes::cron::recognition_sweep),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.cron.clone(),
            auth::cron_auth_middleware,
        ));

    Router::new()
        // Readiness
        .route("/api/readiness", get(routes::readiness::get_readiness))
        .route(
            "/api/readiness/task-forces",
            get(routes::readiness::get_task_force_readiness),
        )
        .route("/api/leaderboard", get(routes::readiness::get_leaderboard))
        // Participants
        .route(
            "/api/participants",
            get(routes::participants::list_participants),
        )
        .route(
            "/api/participants/{id}",
            get(routes::participants::get_participant),
        )
        .route(
            "/api/participants/{id}/activity",
            post(routes::participants::record_activity),
        )
        // Briefings
        .route(
            "/api/briefings/cache",
            delete(routes::briefings::clear_cache),
        )
        .route(
            "/api/briefings/{day}",
            get(routes::briefings::get_briefing),
        )
        // Intel
        .route(
            "/api/intel",
            get(routes::intel::list_intel).post(routes::intel::create_intel),
        )
        .route("/api/intel/events", get(routes::events::intel_events))
        .route("/api/intel/{id}", put(routes::intel::edit_intel))
        .route(
            "/api/intel/{id}/release",
            post(routes::intel::release_intel),
        )
        // Live sessions
        .route("/api/sessions/{code}", get(routes::sessions::get_session))
        .route(
            "/api/sessions/{code}/control",
            post(routes::sessions::control_session),
        )
        .route(
            "/api/sessions/{code}/events",
            get(routes::events::session_events),
        )
        // Presence
        .route(
            "/api/presence/{context}",
            get(routes::sessions::get_presence),
        )
        .route(
            "/api/presence/{context}/heartbeat",
            post(routes::sessions::heartbeat),
        )
        .route(
            "/api/presence/{context}/{participant}",
            delete(routes::sessions::leave),
        )
        .merge(cron)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the academy API server.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener).await
}

/// Start the academy API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("academy server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
