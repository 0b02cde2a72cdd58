use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use leadbot_core::error::LeadbotError;

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "leadbot_session";

/// Session id attached to the request by [`session_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

/// Axum middleware that binds every request to a session context.
///
/// 1. Cookie `leadbot_session` names a live session → reuse it
/// 2. Missing, unknown or expired → create a session, answer with
///    `Set-Cookie`
///
/// The id is handed to handlers as an `Extension<SessionId>`.
pub async fn session_middleware(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_session_cookie)
        .map(str::to_string);

    let reused = match existing {
        Some(id) => app.sessions.touch(&id).await.then_some(id),
        None => None,
    };
    let (id, fresh) = match reused {
        Some(id) => (id, false),
        None => {
            let id = app.sessions.create().await;
            tracing::debug!(session = %id, "session started");
            (id, true)
        }
    };

    req.extensions_mut().insert(SessionId(id.clone()));
    let mut response = next.run(req).await;

    if fresh {
        let cookie = format!("{SESSION_COOKIE}={id}; HttpOnly; SameSite=Lax; Path=/");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Rejects requests whose session has not passed the access gate.
/// Must run inside [`session_middleware`].
pub async fn require_login(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let authenticated = match req.extensions().get::<SessionId>() {
        Some(SessionId(id)) => app.sessions.is_authenticated(id).await,
        None => false,
    };
    if !authenticated {
        return AppError(LeadbotError::NotAuthenticated.into()).into_response();
    }
    next.run(req).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn extract_session_cookie(cookies: &str) -> Option<&str> {
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|v| !v.is_empty())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
