//! vaspflow CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use vaspflow::cli::{Cli, Commands};
use vaspflow::infrastructure::config::ConfigLoader;
use vaspflow::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        vaspflow::cli::handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let mut log_config = LogConfig::from_settings(&config.logging)?;
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logger = LoggerImpl::init(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Run(args) => vaspflow::cli::commands::run::execute(args, &config, cli.json).await,
        Commands::Ingest(args) => {
            vaspflow::cli::commands::ingest::execute(args, &config, cli.json).await
        }
        Commands::Label(args) => vaspflow::cli::commands::label::execute(args, cli.json).await,
    }
}
