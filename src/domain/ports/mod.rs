//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces for the collaborators the
//! tasks consume but do not own:
//! - LocationResolver: maps a run handle to a directory
//! - CredentialsSource: loads results-store connection parameters
//! - Assimilator: writes a run into the results store and returns its document
//! - ConvergenceDiagnostic: inspects a run's primary output for non-convergence
//! - InputWriter: writes rendered inputs into a working directory
//! - ConvergenceHandlerSetup / CorrectiveRunner: the corrective retry steps

pub mod assimilator;
pub mod convergence_diagnostic;
pub mod corrective_steps;
pub mod credentials_source;
pub mod input_writer;
pub mod location_resolver;

pub use assimilator::{Assimilation, Assimilator};
pub use convergence_diagnostic::ConvergenceDiagnostic;
pub use corrective_steps::{ConvergenceHandlerSetup, CorrectiveRunner};
pub use credentials_source::CredentialsSource;
pub use input_writer::InputWriter;
pub use location_resolver::LocationResolver;
