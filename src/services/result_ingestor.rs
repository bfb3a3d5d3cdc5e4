//! Result ingestor.
//!
//! Assimilates a finished run into the results store and decides what the
//! workflow does next: continue, detour through a convergence retry, or
//! defuse the remaining children.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Action, IngestConfig, RunHandle, RunRecord, SpecUpdate, TaskSpec};
use crate::domain::ports::{Assimilator, CredentialsSource, LocationResolver};
use crate::services::convergence_classifier::{Classification, ConvergenceClassifier};
use crate::services::workflow_synthesizer::{FailedRun, WorkflowSynthesizer};

/// Stored-data key of the results-store identifier.
pub const TASK_ID_KEY: &str = "task_id";

pub struct ResultIngestor {
    resolver: Arc<dyn LocationResolver>,
    credentials: Arc<dyn CredentialsSource>,
    assimilator: Arc<dyn Assimilator>,
    classifier: ConvergenceClassifier,
    synthesizer: WorkflowSynthesizer,
}

impl ResultIngestor {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        credentials: Arc<dyn CredentialsSource>,
        assimilator: Arc<dyn Assimilator>,
        classifier: ConvergenceClassifier,
        synthesizer: WorkflowSynthesizer,
    ) -> Self {
        Self {
            resolver,
            credentials,
            assimilator,
            classifier,
            synthesizer,
        }
    }

    /// Ingest the run named by `spec.prev_run_dir`.
    ///
    /// The assimilation write is committed before classification starts, so
    /// every outcome stores the returned identifier. Failed runs are never
    /// errors here; they become a detour or a defuse.
    #[instrument(skip(self, config, spec), fields(prev_run_dir = tracing::field::Empty))]
    pub async fn ingest(&self, config: &IngestConfig, spec: &TaskSpec) -> DomainResult<Action> {
        let handle = spec
            .prev_run_dir
            .as_ref()
            .ok_or(DomainError::MissingSpecField("prev_run_dir"))?;
        tracing::Span::current().record("prev_run_dir", handle.as_str());
        let prev_task_type = spec
            .prev_task_type
            .as_ref()
            .ok_or(DomainError::MissingSpecField("prev_task_type"))?;

        let run_dir = self.resolver.resolve(handle).await?;
        let credentials = self.credentials.load().await?;
        let assimilation = self
            .assimilator
            .assimilate(&run_dir, &credentials, config)
            .await?;
        let task_id = assimilation.task_id.as_value().clone();
        info!(task_id = %assimilation.task_id, "assimilated run");

        let record = RunRecord::from_document(&assimilation.document)?;

        if record.is_successful() {
            let update = SpecUpdate {
                prev_run_dir: Some(RunHandle::from(run_dir.as_path())),
                prev_task_type: Some(prev_task_type.clone()),
                run_tags: Some(spec.run_tags.clone()),
                structure: Some(record.structure().clone()),
                structure_group_id: Some(record.structure_group_id().clone()),
                analysis: record.analysis().cloned(),
            };
            return Ok(Action::complete_with_update(update).stored(TASK_ID_KEY, task_id));
        }

        match self.classifier.classify(&run_dir, &record, spec).await? {
            Classification::Recoverable => {
                let workflow = self.synthesizer.synthesize(&FailedRun {
                    run_dir: &run_dir,
                    record: &record,
                    spec,
                    ingest: config,
                })?;
                info!(graph_id = %workflow.id(), "detouring through convergence retry");
                Ok(Action::detour(workflow).stored(TASK_ID_KEY, task_id))
            }
            Classification::Unrecoverable(reason) => {
                let lineage = ConvergenceClassifier::lineage_state(&record, spec).after_failure();
                warn!(%reason, %lineage, state = %record.state(), "defusing children of failed run");
                Ok(Action::defuse()
                    .stored(TASK_ID_KEY, task_id)
                    .stored("defuse_reason", reason.to_string())
                    .stored("convergence_retry", lineage.to_string()))
            }
        }
    }
}
