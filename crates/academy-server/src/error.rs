use academy_core::error::AcademyError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 404 errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 404 through
/// the `anyhow::Error` chain without touching the `AcademyError` enum.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

/// Private sentinel for an explicit HTTP 400.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    /// Wrap a `spawn_blocking` join failure.
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }
}

fn status_for(e: &AcademyError) -> StatusCode {
    match e {
        AcademyError::NotInitialized => StatusCode::BAD_REQUEST,
        AcademyError::ParticipantNotFound(_)
        | AcademyError::IntelNotFound(_)
        | AcademyError::BriefingNotFound(_) => StatusCode::NOT_FOUND,
        AcademyError::ParticipantExists(_) => StatusCode::CONFLICT,
        AcademyError::InvalidId(_)
        | AcademyError::InvalidLevel(_)
        | AcademyError::InvalidSection(_)
        | AcademyError::InvalidPriority(_)
        | AcademyError::InvalidTitle
        | AcademyError::InvalidDay { .. } => StatusCode::BAD_REQUEST,
        AcademyError::SessionEnded(_)
        | AcademyError::SessionNotStarted(_)
        | AcademyError::StepOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AcademyError::RemoteContent(_) => StatusCode::BAD_GATEWAY,
        AcademyError::Io(_) | AcademyError::Yaml(_) | AcademyError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.downcast_ref::<NotFoundError>().is_some() {
            StatusCode::NOT_FOUND
        } else if self.0.downcast_ref::<BadRequestError>().is_some() {
            StatusCode::BAD_REQUEST
        } else if let Some(e) = self.0.downcast_ref::<AcademyError>() {
            status_for(e)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn participant_not_found_maps_to_404() {
        let err = AppError(AcademyError::ParticipantNotFound("ada".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn intel_not_found_maps_to_404() {
        let err = AppError(AcademyError::IntelNotFound("x".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn briefing_not_found_maps_to_404() {
        let err = AppError(AcademyError::BriefingNotFound(3).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn participant_exists_maps_to_409() {
        let err = AppError(AcademyError::ParticipantExists("ada".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_initialized_maps_to_400() {
        let err = AppError(AcademyError::NotInitialized.into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_day_maps_to_400() {
        let err = AppError(AcademyError::InvalidDay { day: 40, max: 25 }.into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ended_session_maps_to_422() {
        let err = AppError(AcademyError::SessionEnded("day-03".into()).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn step_overflow_maps_to_422() {
        let err = AppError(AcademyError::StepOverflow("day-03".into()).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = AppError(AcademyError::Io(io_err).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_academy_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn constructors_map_to_their_status() {
        assert_eq!(
            AppError::not_found("no session").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::bad_request("bad action").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_body_is_json() {
        let err = AppError(AcademyError::ParticipantNotFound("ada".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
