use anyhow::Context;
use leadbot_core::config::Config;
use leadbot_server::AppState;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    let config = Config::load_with_env(root).context("failed to load config")?;

    if config.uses_default_password() {
        tracing::warn!("serving with the built-in default password; set APP_PASSWORD");
    }
    if config.completion_api_key.is_some() {
        tracing::info!("completion service key configured");
    } else {
        tracing::info!("no completion service key configured");
    }
    tracing::info!(webhook = %config.webhook.url, "leads will be forwarded");

    let state = AppState::new(root, config);
    tracing::info!(store = %state.store.path().display(), "leads will be stored");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!("leadbot → http://localhost:{actual_port}");

        tokio::select! {
            res = leadbot_server::serve_on(state, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
