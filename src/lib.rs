//! vaspflow - workflow tasks for ab-initio simulation pipelines
//!
//! Three tasks run inside a workflow engine: staging inputs, copying the
//! artifacts of a previous run, and ingesting a finished run into the
//! results store. Ingestion is where the workflow can change shape: a run
//! that failed to converge electronically is retried once through a
//! two-node detour (corrective run, then re-ingestion), and any other
//! failure defuses the remaining children.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): run records, specs, actions, workflow
//!   graphs and the port traits for external collaborators
//! - **Service Layer** (`services`): the tasks and the graph builder
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging
//!   and the adapters behind the ports
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use vaspflow::infrastructure::{collaborators, config::ConfigLoader};
//! use vaspflow::services::{DetourSettings, TaskRunner};
//!
//! let config = ConfigLoader::load()?;
//! let runner = TaskRunner::new(collaborators(&config), DetourSettings::from_config(&config.detour)?);
//! let action = runner.run_step(&step, &spec, &working_dir).await?;
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Action, ActionOutcome, Config, ConvergenceRetry, CopyConfig, IngestConfig, RunRecord,
    RunTags, SpecUpdate, TaskSpec, WorkflowGraph, WorkflowStep, CONVERGENCE_GUARD_TAG,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ConvergenceClassifier, FileStager, ResultIngestor, TaskRunner, WorkflowGraphBuilder,
    WorkflowSynthesizer,
};
