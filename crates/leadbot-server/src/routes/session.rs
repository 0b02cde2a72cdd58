use axum::{extract::State, Extension, Json};
use leadbot_core::completion;
use leadbot_core::gate::GateDecision;
use leadbot_core::questionnaire::{FinalizedLead, SessionView, Submission};

use crate::auth::SessionId;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// GET /api/session — what the page should render for this visitor.
pub async fn get_session(
    State(app): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<Json<SessionView>, AppError> {
    let view = app
        .sessions
        .view(&id)
        .await
        .ok_or_else(AppError::session_expired)?;
    Ok(Json(view))
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub password: String,
}

/// POST /api/session/login — check the access password.
///
/// A wrong, non-empty password returns the view with `message` set; an empty
/// one returns the plain gate view. Neither is an HTTP error.
pub async fn login(
    State(app): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
    Json(body): Json<LoginBody>,
) -> Result<Json<SessionView>, AppError> {
    let gate = app.gate.clone();
    let (decision, view) = app
        .sessions
        .with_session(&id, |s| {
            let decision = s.login(&gate, &body.password);
            (decision, s.view())
        })
        .await
        .ok_or_else(AppError::session_expired)?;

    match decision {
        GateDecision::Accepted => tracing::info!(session = %id, "session authenticated"),
        GateDecision::Rejected => tracing::warn!(session = %id, "incorrect password submitted"),
        GateDecision::Empty => {}
    }
    Ok(Json(view.with_message(decision.message())))
}

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct AnswerBody {
    #[serde(default)]
    pub value: String,
}

/// POST /api/session/answer — answer the current question.
///
/// The answer that completes the questionnaire also finalizes the lead and
/// runs the store append and webhook POST, once. The registry lock is not
/// held while those run.
pub async fn submit_answer(
    State(app): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
    Json(body): Json<AnswerBody>,
) -> Result<Json<SessionView>, AppError> {
    let (submission, finalized) = app
        .sessions
        .with_session(&id, |s| {
            let submission = s.submit_answer(&body.value)?;
            let finalized = s.finalize(chrono::Local::now());
            Ok::<_, leadbot_core::LeadbotError>((submission, finalized))
        })
        .await
        .ok_or_else(AppError::session_expired)??;

    if let Submission::Advanced { step } = submission {
        tracing::debug!(session = %id, step, "answer recorded");
    }

    if let Some(FinalizedLead { generation, record }) = finalized {
        let store = app.store.clone();
        let webhook = app.webhook.clone();
        let outcome =
            tokio::task::spawn_blocking(move || completion::complete(record, &store, &webhook))
                .await
                .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
        let kept = app
            .sessions
            .with_session(&id, |s| s.record_outcome(generation, outcome))
            .await
            .unwrap_or(false);
        if !kept {
            tracing::debug!(session = %id, "session reset before completion finished");
        }
    }

    let view = app
        .sessions
        .view(&id)
        .await
        .ok_or_else(AppError::session_expired)?;
    Ok(Json(view))
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

/// POST /api/session/reset — "Start New Inquiry".
pub async fn reset(
    State(app): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<Json<SessionView>, AppError> {
    let keep_login = !app.config.session.reset_requires_login;
    let view = app
        .sessions
        .with_session(&id, |s| {
            s.reset(keep_login);
            s.view()
        })
        .await
        .ok_or_else(AppError::session_expired)?;
    tracing::debug!(session = %id, keep_login, "session reset");
    Ok(Json(view))
}
