//! Service layer: the orchestration tasks and the graph builder they share.

pub mod convergence_classifier;
pub mod file_stager;
pub mod graph_builder;
pub mod input_stager;
pub mod relaxation;
pub mod result_ingestor;
pub mod task_runner;
pub mod workflow_synthesizer;

pub use convergence_classifier::{Classification, ConvergenceClassifier, UnrecoverableReason};
pub use file_stager::FileStager;
pub use graph_builder::WorkflowGraphBuilder;
pub use input_stager::InputStager;
pub use relaxation::most_recent_version;
pub use result_ingestor::{ResultIngestor, TASK_ID_KEY};
pub use task_runner::{Collaborators, TaskRunner};
pub use workflow_synthesizer::{derive_label, slugify, DetourSettings, FailedRun, WorkflowSynthesizer};
