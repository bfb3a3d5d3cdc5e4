//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::domain::models::Config;
use crate::infrastructure::collaborators;
use crate::services::{DetourSettings, TaskRunner};

#[derive(Parser, Debug)]
#[command(name = "vaspflow")]
#[command(about = "Workflow tasks for staging, copying and ingesting ab-initio runs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .vaspflow/config.yaml)
    #[arg(short, long, global = true, env = "VASPFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one workflow step, or a node's list of steps
    Run(commands::run::RunArgs),

    /// Ingest a finished run and classify the outcome
    Ingest(commands::ingest::IngestArgs),

    /// Print the node label derived from a structure and task type
    Label(commands::label::LabelArgs),
}

/// Build a task runner wired to the production adapters.
pub fn task_runner(config: &Config) -> Result<TaskRunner> {
    let detour = DetourSettings::from_config(&config.detour)
        .context("Invalid detour configuration")?;
    Ok(TaskRunner::new(collaborators(config), detour))
}

/// Print an error and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({ "error": err.to_string(), "causes": chain });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
