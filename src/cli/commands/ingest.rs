//! `vaspflow ingest`: ingest a finished run and classify it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::commands::read_spec;
use crate::cli::output::{output, ActionOutput};
use crate::cli::task_runner;
use crate::domain::models::{Config, IngestConfig, WorkflowStep};

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// JSON file holding the task spec (needs prev_run_dir and prev_task_type)
    #[arg(long)]
    pub spec: PathBuf,

    /// Parse the uniform-mesh density of states
    #[arg(long)]
    pub parse_uniform: bool,

    /// Overwrite an existing document for the same run
    #[arg(long)]
    pub update_duplicates: bool,
}

pub async fn execute(args: IngestArgs, config: &Config, json: bool) -> Result<()> {
    let spec = read_spec(&args.spec).await?;
    let ingest = IngestConfig::new(
        args.parse_uniform || config.ingestion.parse_uniform,
        args.update_duplicates || config.ingestion.update_duplicates,
        config.ingestion.additional_fields.clone(),
    )
    .context("Invalid ingestion options")?;

    let workdir = std::env::current_dir().context("Failed to determine working directory")?;
    let action = task_runner(config)?
        .run_step(&WorkflowStep::IngestAndClassify { config: ingest }, &spec, &workdir)
        .await
        .context("Ingestion failed")?;

    output(&ActionOutput(action), json);
    Ok(())
}
