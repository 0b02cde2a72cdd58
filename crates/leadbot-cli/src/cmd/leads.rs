use crate::output::{print_json, print_table};
use anyhow::Context;
use leadbot_core::config::Config;
use leadbot_core::lead::HEADER;
use leadbot_core::store::LeadStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = LeadStore::open(config.store_path_in(root));
    let leads = store
        .load_all()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    if json {
        return print_json(&leads);
    }

    if leads.is_empty() {
        println!("No leads captured yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = leads
        .iter()
        .map(|lead| lead.row().iter().map(|c| c.replace('\n', " ")).collect())
        .collect();
    print_table(&HEADER, rows);
    Ok(())
}
