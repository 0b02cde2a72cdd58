use anyhow::Context;
use leadbot_core::config::Config;
use leadbot_core::store::LeadStore;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = Config::path(root);
    if config_path.exists() {
        println!("kept existing {}", config_path.display());
    } else {
        Config::default()
            .save(root)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!("created {}", config_path.display());
    }

    let config = Config::load(root).context("failed to load config")?;
    let store = LeadStore::open(config.store_path_in(root));
    if store
        .ensure_initialized()
        .with_context(|| format!("failed to create {}", store.path().display()))?
    {
        println!("created {}", store.path().display());
    } else {
        println!("kept existing {}", store.path().display());
    }

    if config.uses_default_password() {
        println!("note: the default password is in use; set `password` in leadbot.yaml or APP_PASSWORD");
    }
    Ok(())
}
