//! Input stager: writes a node's rendered inputs into its working directory.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Action, TaskSpec};
use crate::domain::ports::InputWriter;

pub struct InputStager {
    writer: Arc<dyn InputWriter>,
}

impl InputStager {
    pub fn new(writer: Arc<dyn InputWriter>) -> Self {
        Self { writer }
    }

    /// Write `spec.inputs` into `working_dir`.
    #[instrument(skip(self, spec))]
    pub async fn stage(&self, spec: &TaskSpec, working_dir: &Path) -> DomainResult<Action> {
        let inputs = spec
            .inputs
            .as_ref()
            .filter(|inputs| !inputs.is_empty())
            .ok_or(DomainError::MissingSpecField("inputs"))?;

        let written = self.writer.write_inputs(inputs, working_dir).await?;
        info!(files = ?written, "wrote simulation inputs");

        Ok(Action::complete().stored("written_files", Value::from(written)))
    }
}
