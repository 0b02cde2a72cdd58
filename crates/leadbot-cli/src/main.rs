mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "leadbot",
    about = "Password-gated questionnaire that captures real estate leads",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding leadbot.yaml (default: auto-detect, else cwd)
    #[arg(long, global = true, env = "LEADBOT_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default leadbot.yaml and create the lead store
    Init,

    /// Run the web questionnaire
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "8501", env = "LEADBOT_PORT")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },

    /// List captured leads
    Leads {
        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
        Commands::Leads { json } => cmd::leads::run(&root, json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
