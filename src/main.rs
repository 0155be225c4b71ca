//! Sitat CLI entry point.

use anyhow::Result;
use clap::Parser;
use sitat::cli::{commands, Cli, Commands};
use sitat::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("sitat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Index { file, id, title } => {
            commands::run_index(file, id.clone(), title.clone(), settings).await?;
        }

        Commands::Summarize { id, interviewee } => {
            commands::run_summarize(id, interviewee, settings).await?;
        }

        Commands::Rewrite { id, interviewee } => {
            commands::run_rewrite(id, interviewee, settings).await?;
        }

        Commands::Ask { id, query } => {
            commands::run_ask(id, query, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Delete { id } => {
            commands::run_delete(id, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
