pub mod action;
pub mod composition;
pub mod config;
pub mod credentials;
pub mod run_record;
pub mod spec;
pub mod task_config;
pub mod workflow;

pub use action::{Action, ActionOutcome};
pub use composition::Composition;
pub use config::{
    CommandsConfig, Config, CredentialsConfig, DetourConfig, IngestionConfig, LoggingConfig,
};
pub use credentials::Credentials;
pub use run_record::{ExternalId, RunRecord, RunState};
pub use spec::{
    ConvergenceRetry, DuplicateStrategy, InputSet, QueueHints, RunHandle, RunTags, SpecUpdate,
    TaskSpec, CONVERGENCE_GUARD_TAG,
};
pub use task_config::{
    ArtifactSelection, CopyConfig, IngestConfig, ALL_FILES_SENTINEL, CHECKPOINT_FILE,
    PRIMARY_OUTPUT_FILE, STRUCTURE_INPUT_FILE,
};
pub use workflow::{NodeId, WorkflowGraph, WorkflowNode, WorkflowStep};
