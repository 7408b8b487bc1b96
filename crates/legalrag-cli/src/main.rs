//! Legalrag CLI
//!
//! Ask legal questions against a local corpus of ingested documents.

use anyhow::Result;
use clap::Parser;
use legalrag_core::{exit_codes, Config, LegalRagError};

mod app;
mod commands;
mod logging;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from(&config_path)?;

    let guard = logging::init(&config.logging, cli.verbose)?;
    if let Some(ref path) = guard.log_file {
        tracing::debug!("Logging to {}", path.display());
    }

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, &config, cli.format, cli.verbose).await,
        Commands::Research(args) => {
            commands::research::run(args, &config, cli.format, cli.verbose).await
        }
        Commands::Ingest(args) => commands::ingest::run(args, &config, cli.format).await,
        Commands::Stats => commands::stats::run(&config, cli.format).await,
        Commands::Clear => commands::clear::run(&config).await,
        Commands::Relevance(args) => commands::relevance::run(args, &config, cli.format).await,
        Commands::Analyze(args) => commands::analyze::run(args, &config, cli.format).await,
        Commands::Config => commands::config::run(&config, &config_path, cli.format),
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<LegalRagError>()
        .map(LegalRagError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
