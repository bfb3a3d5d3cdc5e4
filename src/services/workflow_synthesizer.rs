//! Workflow synthesizer.
//!
//! Builds the corrective detour for a run that failed to converge:
//!
//! ```text
//! retry (copy inputs -> handler setup -> corrective run)
//!   |
//!   v
//! re-ingest (ingest and classify)
//! ```
//!
//! Both nodes carry the convergence guard so the lineage is retried at
//! most once.

use std::path::Path;

use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Composition, ConvergenceRetry, CopyConfig, DetourConfig, DuplicateStrategy, IngestConfig,
    QueueHints, RunHandle, RunRecord, TaskSpec, WorkflowGraph, WorkflowStep,
    CONVERGENCE_GUARD_TAG,
};
use crate::services::graph_builder::WorkflowGraphBuilder;

/// Validated settings for synthesized detours.
#[derive(Debug, Clone, PartialEq)]
pub struct DetourSettings {
    priority: u32,
    queue_nodes: u32,
    ingest_task_type: String,
    duplicate_strategy: DuplicateStrategy,
    retry_copy: CopyConfig,
}

impl DetourSettings {
    pub fn from_config(config: &DetourConfig) -> DomainResult<Self> {
        if config.ingest_task_type.trim().is_empty() {
            return Err(DomainError::InvalidTaskConfig(
                "detour ingest task type cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            priority: config.priority,
            queue_nodes: config.queue_nodes,
            ingest_task_type: config.ingest_task_type.clone(),
            duplicate_strategy: DuplicateStrategy::new(config.duplicate_strategy.clone()),
            // The retried run starts from the failed run's own structure input.
            retry_copy: CopyConfig::new(Some(config.retry_files.clone()), false)?,
        })
    }

    pub const fn priority(&self) -> u32 {
        self.priority
    }

    pub fn ingest_task_type(&self) -> &str {
        &self.ingest_task_type
    }

    pub const fn retry_copy(&self) -> &CopyConfig {
        &self.retry_copy
    }
}

impl Default for DetourSettings {
    fn default() -> Self {
        Self {
            priority: 4,
            queue_nodes: 1,
            ingest_task_type: "VASP db insertion".to_string(),
            duplicate_strategy: DuplicateStrategy::new("DupeFinderVasp"),
            retry_copy: CopyConfig::new(
                Some(
                    ["INCAR", "KPOINTS", "POSCAR", "POTCAR", "CONTCAR"]
                        .into_iter()
                        .map(String::from)
                        .collect(),
                ),
                false,
            )
            .unwrap_or_default(),
        }
    }
}

/// A failed run about to be retried.
#[derive(Debug, Clone, Copy)]
pub struct FailedRun<'a> {
    /// Resolved directory of the failed run.
    pub run_dir: &'a Path,
    pub record: &'a RunRecord,
    /// Spec of the ingest node that observed the failure.
    pub spec: &'a TaskSpec,
    /// Ingest options reused by the re-ingest node.
    pub ingest: &'a IngestConfig,
}

pub struct WorkflowSynthesizer {
    settings: DetourSettings,
}

impl WorkflowSynthesizer {
    pub const fn new(settings: DetourSettings) -> Self {
        Self { settings }
    }

    pub const fn settings(&self) -> &DetourSettings {
        &self.settings
    }

    /// Build the two-node corrective graph for `failed`.
    #[instrument(skip(self, failed), fields(run_dir = %failed.run_dir.display()))]
    pub fn synthesize(&self, failed: &FailedRun<'_>) -> DomainResult<WorkflowGraph> {
        let spec = failed.spec;
        let record = failed.record;

        let rerun_task_type = spec
            .prev_task_type
            .clone()
            .ok_or(DomainError::MissingSpecField("prev_task_type"))?;
        let ingest_task_type = spec
            .task_type
            .clone()
            .ok_or(DomainError::MissingSpecField("task_type"))?;

        let tags = spec.run_tags.with_tag(CONVERGENCE_GUARD_TAG);

        let retry_spec = TaskSpec {
            prev_run_dir: Some(RunHandle::from(failed.run_dir)),
            task_type: Some(rerun_task_type.clone()),
            prev_task_type: Some(ingest_task_type),
            structure: Some(record.structure().clone()),
            structure_group_id: Some(record.structure_group_id().clone()),
            run_tags: tags.clone(),
            convergence_retry: ConvergenceRetry::RetryInFlight,
            priority: Some(self.settings.priority),
            duplicate_strategy: Some(self.settings.duplicate_strategy.clone()),
            ..Default::default()
        };

        // Points at the failed run until the corrective run's update lands,
        // so a fizzled retry still re-ingests and defuses.
        let ingest_spec = TaskSpec {
            prev_run_dir: Some(RunHandle::from(failed.run_dir)),
            prev_task_type: Some(rerun_task_type.clone()),
            task_type: Some(self.settings.ingest_task_type.clone()),
            run_tags: tags,
            convergence_retry: ConvergenceRetry::RetryInFlight,
            priority: Some(self.settings.priority),
            allow_fizzled_parents: true,
            queue: Some(QueueHints {
                nnodes: Some(self.settings.queue_nodes),
            }),
            ..Default::default()
        };

        let retry_name = derive_label(record.structure(), &rerun_task_type)?;
        let ingest_name = derive_label(record.structure(), &self.settings.ingest_task_type)?;

        let mut builder = WorkflowGraphBuilder::new();
        let retry = builder.add_node(
            retry_name,
            vec![
                WorkflowStep::Copy {
                    config: self.settings.retry_copy.clone(),
                },
                WorkflowStep::SetupConvergenceHandler,
                WorkflowStep::CorrectiveRun,
            ],
            retry_spec,
        );
        let ingest = builder.add_node(
            ingest_name,
            vec![WorkflowStep::IngestAndClassify {
                config: failed.ingest.clone(),
            }],
            ingest_spec,
        );
        builder.add_edge(retry, ingest)?;

        let graph = builder.build()?;
        info!(graph_id = %graph.id(), nodes = graph.nodes().len(), "synthesized convergence detour");
        Ok(graph)
    }
}

/// Node label: alphabetized reduced formula of `structure` joined to
/// `task_type`, reduced to a filesystem-safe slug.
pub fn derive_label(structure: &Value, task_type: &str) -> DomainResult<String> {
    let formula = Composition::from_structure(structure)?.reduced_alphabetical_formula();
    Ok(slugify(&format!("{formula}--{task_type}")))
}

/// Keep ASCII alphanumerics and `-_.() `, then turn spaces into underscores.
pub fn slugify(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || "-_.() ".contains(*c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}
