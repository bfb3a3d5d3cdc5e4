//! External-command adapters.
//!
//! Each collaborator that lives outside this crate (assimilation,
//! convergence diagnostic, handler setup, corrective run) is reached by
//! spawning a configured command. The request is written to the child's
//! stdin as one JSON document; adapters that expect a reply read one JSON
//! document from stdout. A non-zero exit status is a failure and the
//! child's stderr becomes the error message.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Credentials, IngestConfig, TaskSpec};
use crate::domain::ports::{
    Assimilation, Assimilator, ConvergenceDiagnostic, ConvergenceHandlerSetup, CorrectiveRunner,
};

/// A configured command line: program followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    name: &'static str,
    argv: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: &'static str, argv: Vec<String>) -> Self {
        Self { name, argv }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Run the command with `request` on stdin and return its stdout.
    ///
    /// The error string is suitable for the caller's error variant.
    #[instrument(skip(self, request), fields(command = self.name))]
    pub async fn run(&self, request: &Value) -> Result<String, String> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| format!("no command configured for {}", self.name))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to spawn {program}: {e}"))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| "failed to get stdin handle".to_string())?;
        let payload = request.to_string().into_bytes();
        let write_request = async move {
            let written = stdin.write_all(&payload).await;
            // Close stdin to signal end of input
            drop(stdin);
            written
        };

        // stdout is drained while the request is still being written.
        let (written, output) = tokio::join!(write_request, child.wait_with_output());
        let output = output.map_err(|e| format!("failed to wait for {program}: {e}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        written.map_err(|e| format!("failed to write request: {e}"))?;
        debug!(bytes = output.stdout.len(), "command finished");
        String::from_utf8(output.stdout).map_err(|e| format!("stdout is not UTF-8: {e}"))
    }
}

/// Assimilation through an external command.
///
/// Request: `{"run_dir", "credentials", "options"}`. Reply:
/// `{"task_id", "document"}`.
pub struct CommandAssimilator {
    command: ExternalCommand,
}

impl CommandAssimilator {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            command: ExternalCommand::new("assimilate", argv),
        }
    }
}

#[async_trait]
impl Assimilator for CommandAssimilator {
    async fn assimilate(
        &self,
        run_dir: &Path,
        credentials: &Credentials,
        options: &IngestConfig,
    ) -> DomainResult<Assimilation> {
        let request = json!({
            "run_dir": run_dir,
            "credentials": credentials,
            "options": options,
        });
        let stdout = self
            .command
            .run(&request)
            .await
            .map_err(DomainError::Assimilation)?;
        serde_json::from_str(&stdout)
            .map_err(|e| DomainError::Assimilation(format!("unreadable reply: {e}")))
    }
}

/// Convergence diagnostic through an external command.
///
/// Request: `{"output_artifact"}`. Reply: `{"unconverged": bool}` or a bare
/// boolean.
pub struct CommandConvergenceDiagnostic {
    command: ExternalCommand,
}

impl CommandConvergenceDiagnostic {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            command: ExternalCommand::new("convergence_check", argv),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DiagnosticReply {
    Bare(bool),
    Object { unconverged: bool },
}

#[async_trait]
impl ConvergenceDiagnostic for CommandConvergenceDiagnostic {
    async fn is_unconverged(&self, output_artifact: &Path) -> DomainResult<bool> {
        let stdout = self
            .command
            .run(&json!({ "output_artifact": output_artifact }))
            .await
            .map_err(DomainError::Diagnostic)?;
        let reply: DiagnosticReply = serde_json::from_str(stdout.trim())
            .map_err(|e| DomainError::Diagnostic(format!("unreadable reply: {e}")))?;
        Ok(match reply {
            DiagnosticReply::Bare(flag) | DiagnosticReply::Object { unconverged: flag } => flag,
        })
    }
}

/// Convergence-handler setup through an external command.
pub struct CommandHandlerSetup {
    command: ExternalCommand,
}

impl CommandHandlerSetup {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            command: ExternalCommand::new("handler_setup", argv),
        }
    }
}

#[async_trait]
impl ConvergenceHandlerSetup for CommandHandlerSetup {
    async fn apply(&self, working_dir: &Path) -> DomainResult<()> {
        self.command
            .run(&json!({ "working_dir": working_dir }))
            .await
            .map(drop)
            .map_err(|reason| DomainError::ExternalStep {
                step: self.command.name().to_string(),
                reason,
            })
    }
}

/// Corrective simulation run through an external command.
pub struct CommandCorrectiveRunner {
    command: ExternalCommand,
}

impl CommandCorrectiveRunner {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            command: ExternalCommand::new("corrective_run", argv),
        }
    }
}

#[async_trait]
impl CorrectiveRunner for CommandCorrectiveRunner {
    async fn run(&self, working_dir: &Path, spec: &TaskSpec) -> DomainResult<()> {
        self.command
            .run(&json!({ "working_dir": working_dir, "spec": spec }))
            .await
            .map(drop)
            .map_err(|reason| DomainError::ExternalStep {
                step: self.command.name().to_string(),
                reason,
            })
    }
}
