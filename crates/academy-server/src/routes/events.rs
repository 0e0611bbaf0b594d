use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/sessions/:code/events: SSE stream of `state` events. The current
/// state is sent first; missed updates are not replayed. The stream closes
/// after the final `is_active: false` state. 404 when no session is running.
pub async fn session_events(
    State(app): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let (current, rx) = app
        .live
        .subscribe(&code)
        .await
        .ok_or_else(|| AppError::not_found(format!("no live session '{code}'")))?;
    tracing::debug!(session = %code, "session subscriber connected");

    let initial = tokio_stream::iter(state_event(current).map(Ok::<Event, Infallible>));
    let updates = BroadcastStream::new(rx)
        .filter_map(|msg| msg.ok().and_then(state_event).map(Ok::<Event, Infallible>));
    Ok(Sse::new(initial.chain(updates)).keep_alive(KeepAlive::default()))
}

/// GET /api/intel/events: SSE stream of `intel_released` events.
pub async fn intel_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.live.subscribe_intel();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok()
            .and_then(|e| Event::default().event("intel_released").json_data(e).ok())
            .map(Ok::<Event, Infallible>)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn state_event(state: academy_core::session::SessionState) -> Option<Event> {
    Event::default().event("state").json_data(state).ok()
}
