use std::sync::Arc;

use constant_time_eq::constant_time_eq;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Shared secret guarding the scheduled sweep endpoints.
///
/// When `secret` is `None` the endpoints are disabled and every call gets 503,
/// so an unconfigured deployment never runs sweeps for anonymous callers.
#[derive(Clone, Debug, Default)]
pub struct CronAuth {
    pub secret: Option<Arc<str>>,
}

impl CronAuth {
    pub fn none() -> Self {
        Self { secret: None }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(Arc::from(secret.into())),
        }
    }
}

/// Axum middleware requiring `Authorization: Bearer <secret>`.
///
/// 1. No secret configured → 503
/// 2. Header missing or not a bearer token → 401
/// 3. Token mismatch → 401 (compared in constant time)
pub async fn cron_auth_middleware(
    State(auth): State<CronAuth>,
    req: Request,
    next: Next,
) -> Response {
    let Some(secret) = auth.secret.as_deref() else {
        tracing::warn!(path = %req.uri().path(), "cron call rejected: no secret configured");
        return json_response(503, r#"{"error":"cron secret not configured"}"#);
    };

    let presented = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token);

    match presented {
        Some(token) if secret_matches(token, secret) => next.run(req).await,
        _ => {
            tracing::warn!(path = %req.uri().path(), "cron call rejected: bad bearer token");
            json_response(401, r#"{"error":"unauthorized"}"#)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

fn secret_matches(presented: &str, secret: &str) -> bool {
    constant_time_eq(presented.as_bytes(), secret.as_bytes())
}

fn json_response(status: u16, body: &'static str) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .expect("infallible: all header values are valid ASCII")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
