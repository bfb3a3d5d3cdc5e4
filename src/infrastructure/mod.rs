//! Infrastructure layer module
//!
//! This module contains the adapters behind the domain ports:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Credentials file source
//! - Filesystem location resolver and input writer
//! - External-command adapters for assimilation, diagnostics and corrective steps

pub mod config;
pub mod credentials;
pub mod inputs;
pub mod location;
pub mod logging;
pub mod process;

use std::sync::Arc;

use crate::domain::models::Config;
use crate::services::Collaborators;

/// Wire every port to its production adapter.
pub fn collaborators(config: &Config) -> Collaborators {
    Collaborators {
        resolver: Arc::new(location::FsLocationResolver::new(
            config.run_locations.clone(),
        )),
        credentials: Arc::new(credentials::FileCredentialsSource::new(&config.credentials)),
        assimilator: Arc::new(process::CommandAssimilator::new(
            config.commands.assimilate.clone(),
        )),
        diagnostic: Arc::new(process::CommandConvergenceDiagnostic::new(
            config.commands.convergence_check.clone(),
        )),
        input_writer: Arc::new(inputs::FileInputWriter),
        handler_setup: Arc::new(process::CommandHandlerSetup::new(
            config.commands.handler_setup.clone(),
        )),
        corrective_runner: Arc::new(process::CommandCorrectiveRunner::new(
            config.commands.corrective_run.clone(),
        )),
    }
}
