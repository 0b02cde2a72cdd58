pub mod auth;
pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    // Reachable only after the access gate.
    let gated = Router::new()
        .route("/api/session/answer", post(routes::session::submit_answer))
        .route("/api/session/reset", post(routes::session::reset))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_login,
        ));

    let session = Router::new()
        .route("/api/session", get(routes::session::get_session))
        .route("/api/session/login", post(routes::session::login))
        .merge(gated)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::session_middleware,
        ));

    Router::new()
        .merge(session)
        .route("/api/health", get(routes::health::health))
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the leadbot web UI server on a pre-bound listener.
///
/// The caller binds the `TcpListener` so it can read the actual port before
/// starting (useful when `port = 0` and the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();

    let store = app_state.store.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || store.ensure_initialized()).await? {
        tracing::warn!(
            path = %app_state.store.path().display(),
            error = %e,
            "could not create lead store"
        );
    }

    let app = build_router(app_state);

    tracing::info!("leadbot listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
