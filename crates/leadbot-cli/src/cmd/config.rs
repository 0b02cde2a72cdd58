use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use leadbot_core::config::Config;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration with secrets redacted
    Show {
        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Validate the configuration (including environment overrides)
    Validate,
}

pub fn run(root: &Path, subcommand: ConfigSubcommand) -> anyhow::Result<()> {
    match subcommand {
        ConfigSubcommand::Show { json } => show(root, json),
        ConfigSubcommand::Validate => validate(root),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_with_env(root).context("failed to load config")?;
    let password = if config.uses_default_password() {
        "(default)"
    } else {
        "(set)"
    };
    let completion_key = if config.completion_api_key.is_some() {
        "(set)"
    } else {
        "(none)"
    };
    let store = config.store_path_in(root);

    if json {
        let value = serde_json::json!({
            "password": password,
            "store_path": store,
            "webhook": config.webhook,
            "completion_api_key": completion_key,
            "session": config.session,
        });
        return print_json(&value);
    }

    println!("Password:             {password}");
    println!("Store:                {}", store.display());
    println!("Webhook URL:          {}", config.webhook.url);
    println!("Webhook timeout:      {}s", config.webhook.timeout_secs);
    println!("Completion key:       {completion_key}");
    println!(
        "Reset requires login: {}",
        config.session.reset_requires_login
    );
    println!("Session idle TTL:     {}m", config.session.idle_ttl_minutes);
    println!("Max sessions:         {}", config.session.max_sessions);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path) -> anyhow::Result<()> {
    Config::load_with_env(root).context("invalid configuration")?;
    println!("Config OK");
    Ok(())
}
