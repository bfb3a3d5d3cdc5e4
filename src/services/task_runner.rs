//! Task runner: closed dispatch over [`WorkflowStep`].

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, Instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Action, RunHandle, SpecUpdate, TaskSpec, WorkflowStep};
use crate::domain::ports::{
    Assimilator, ConvergenceDiagnostic, ConvergenceHandlerSetup, CorrectiveRunner,
    CredentialsSource, InputWriter, LocationResolver,
};
use crate::services::convergence_classifier::ConvergenceClassifier;
use crate::services::file_stager::FileStager;
use crate::services::input_stager::InputStager;
use crate::services::result_ingestor::ResultIngestor;
use crate::services::workflow_synthesizer::{DetourSettings, WorkflowSynthesizer};

/// External collaborators needed to run every kind of step.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn LocationResolver>,
    pub credentials: Arc<dyn CredentialsSource>,
    pub assimilator: Arc<dyn Assimilator>,
    pub diagnostic: Arc<dyn ConvergenceDiagnostic>,
    pub input_writer: Arc<dyn InputWriter>,
    pub handler_setup: Arc<dyn ConvergenceHandlerSetup>,
    pub corrective_runner: Arc<dyn CorrectiveRunner>,
}

pub struct TaskRunner {
    inputs: InputStager,
    stager: FileStager,
    ingestor: ResultIngestor,
    handler_setup: Arc<dyn ConvergenceHandlerSetup>,
    corrective_runner: Arc<dyn CorrectiveRunner>,
}

impl TaskRunner {
    pub fn new(collaborators: Collaborators, detour: DetourSettings) -> Self {
        let classifier = ConvergenceClassifier::new(collaborators.diagnostic);
        let ingestor = ResultIngestor::new(
            Arc::clone(&collaborators.resolver),
            collaborators.credentials,
            collaborators.assimilator,
            classifier,
            WorkflowSynthesizer::new(detour),
        );

        Self {
            inputs: InputStager::new(collaborators.input_writer),
            stager: FileStager::new(collaborators.resolver),
            ingestor,
            handler_setup: collaborators.handler_setup,
            corrective_runner: collaborators.corrective_runner,
        }
    }

    /// Run one step against `spec` in `working_dir`.
    pub async fn run_step(
        &self,
        step: &WorkflowStep,
        spec: &TaskSpec,
        working_dir: &Path,
    ) -> DomainResult<Action> {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!("run_step", %invocation_id, step = step.name());

        let action = self.dispatch(step, spec, working_dir).instrument(span).await?;
        info!(%invocation_id, step = step.name(), outcome = outcome_kind(&action), "step finished");
        Ok(action)
    }

    async fn dispatch(
        &self,
        step: &WorkflowStep,
        spec: &TaskSpec,
        working_dir: &Path,
    ) -> DomainResult<Action> {
        debug!(working_dir = %working_dir.display(), "starting step");
        match step {
            WorkflowStep::Stage => self.inputs.stage(spec, working_dir).await,
            WorkflowStep::Copy { config } => self.stager.stage(config, spec, working_dir).await,
            WorkflowStep::IngestAndClassify { config } => self.ingestor.ingest(config, spec).await,
            WorkflowStep::SetupConvergenceHandler => {
                self.handler_setup.apply(working_dir).await?;
                Ok(Action::complete())
            }
            WorkflowStep::CorrectiveRun => self.corrective_run(spec, working_dir).await,
        }
    }

    /// Run a node's steps in order, the way the runtime executes a node.
    ///
    /// Updates from earlier steps are merged into the spec seen by later
    /// ones. A detour or defuse ends the node early.
    pub async fn run_node(
        &self,
        steps: &[WorkflowStep],
        spec: &TaskSpec,
        working_dir: &Path,
    ) -> DomainResult<Action> {
        let mut spec = spec.clone();
        let mut combined = Action::complete();

        for step in steps {
            let action = self.run_step(step, &spec, working_dir).await?;
            if let Some(update) = action.update_spec() {
                spec.apply_update(update);
            }
            let ends = action.ends_node();
            combined = combined.then(action);
            if ends {
                debug!(step = step.name(), "node ended early");
                break;
            }
        }

        Ok(combined)
    }

    async fn corrective_run(&self, spec: &TaskSpec, working_dir: &Path) -> DomainResult<Action> {
        let task_type = spec
            .task_type
            .clone()
            .ok_or(DomainError::MissingSpecField("task_type"))?;
        self.corrective_runner.run(working_dir, spec).await?;

        // Downstream ingestion consumes the retried run, not the failed one.
        Ok(Action::complete_with_update(SpecUpdate {
            prev_run_dir: Some(RunHandle::from(working_dir)),
            prev_task_type: Some(task_type),
            ..Default::default()
        }))
    }
}

fn outcome_kind(action: &Action) -> &'static str {
    if action.defuse_children() {
        "defuse"
    } else if action.detour_workflow().is_some() {
        "detour"
    } else {
        "complete"
    }
}
