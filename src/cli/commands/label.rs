//! `vaspflow label`: print the derived node label.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::cli::commands::read_json;
use crate::cli::output::{output, LabelOutput};
use crate::domain::models::Composition;
use crate::services::derive_label;

#[derive(Args, Debug)]
pub struct LabelArgs {
    /// JSON file holding a structure descriptor
    #[arg(long)]
    pub structure: PathBuf,

    /// Task type appended to the formula
    #[arg(short, long)]
    pub task_type: String,
}

pub async fn execute(args: LabelArgs, json: bool) -> Result<()> {
    let structure: Value = read_json(&args.structure).await?;
    let formula = Composition::from_structure(&structure)
        .context("Invalid structure descriptor")?
        .reduced_alphabetical_formula();
    let label = derive_label(&structure, &args.task_type)?;

    output(
        &LabelOutput {
            label,
            formula,
            task_type: args.task_type,
        },
        json,
    );
    Ok(())
}
