//! `vaspflow run`: execute workflow steps against a spec.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use crate::cli::commands::{read_json, read_spec};
use crate::cli::output::{output, ActionOutput};
use crate::cli::task_runner;
use crate::domain::models::{Config, WorkflowStep};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON file holding one step, or a list of steps run as a node
    #[arg(long)]
    pub step: PathBuf,

    /// JSON file holding the task spec
    #[arg(long)]
    pub spec: PathBuf,

    /// Working directory of the invocation (defaults to the current directory)
    #[arg(short, long)]
    pub workdir: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StepFile {
    Node(Vec<WorkflowStep>),
    Single(WorkflowStep),
}

pub async fn execute(args: RunArgs, config: &Config, json: bool) -> Result<()> {
    let steps: StepFile = read_json(&args.step).await.context("Invalid step file")?;
    let spec = read_spec(&args.spec).await?;
    let workdir = match args.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    let runner = task_runner(config)?;
    let action = match steps {
        StepFile::Single(step) => runner.run_step(&step, &spec, &workdir).await,
        StepFile::Node(steps) => runner.run_node(&steps, &spec, &workdir).await,
    }
    .context("Step failed")?;

    output(&ActionOutput(action), json);
    Ok(())
}
