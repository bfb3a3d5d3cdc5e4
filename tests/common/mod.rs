//! Common test utilities for integration tests
//!
//! In-memory stand-ins for every port, plus builders for structures and
//! assimilated documents.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use vaspflow::domain::errors::{DomainError, DomainResult};
use vaspflow::domain::models::{
    Credentials, ExternalId, IngestConfig, InputSet, RunHandle, TaskSpec,
};
use vaspflow::domain::ports::{
    Assimilation, Assimilator, ConvergenceDiagnostic, ConvergenceHandlerSetup, CorrectiveRunner,
    CredentialsSource, InputWriter, LocationResolver,
};
use vaspflow::services::Collaborators;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Structure descriptor with one fully occupied site per element.
pub fn structure(elements: &[&str]) -> Value {
    json!({
        "sites": elements
            .iter()
            .map(|e| json!({ "species": [{ "element": e, "occu": 1 }] }))
            .collect::<Vec<_>>()
    })
}

pub fn successful_document() -> Value {
    json!({
        "state": "successful",
        "analysis": { "bandgap": 2.1, "errors": [] },
        "snl": structure(&["Fe", "O", "Fe", "O", "O"]),
        "snlgroup_id": 101,
    })
}

pub fn failed_document(run_tags: &[&str]) -> Value {
    json!({
        "state": "failed",
        "snl": structure(&["O", "O", "Fe", "O", "Fe"]),
        "snlgroup_id": 101,
        "run_tags": run_tags,
    })
}

/// Spec of an ingest node consuming a relaxation run.
pub fn ingest_spec(run_dir: &Path, tags: &[&str]) -> TaskSpec {
    TaskSpec {
        prev_run_dir: Some(RunHandle::from(run_dir)),
        task_type: Some("VASP db insertion".to_string()),
        prev_task_type: Some("GGA optimize structure (2x)".to_string()),
        run_tags: tags.iter().copied().collect(),
        ..Default::default()
    }
}

/// Resolves every handle to its own path when it exists.
#[derive(Default)]
pub struct IdentityResolver;

#[async_trait]
impl LocationResolver for IdentityResolver {
    async fn resolve(&self, handle: &RunHandle) -> DomainResult<PathBuf> {
        let path = PathBuf::from(handle.as_str());
        if path.exists() {
            Ok(path)
        } else {
            Err(DomainError::LocationNotFound(handle.to_string()))
        }
    }
}

pub struct StaticCredentials;

#[async_trait]
impl CredentialsSource for StaticCredentials {
    async fn load(&self) -> DomainResult<Credentials> {
        Ok(Credentials {
            host: "localhost".to_string(),
            port: 27017,
            database: "vasp".to_string(),
            user: "admin".to_string(),
            password: "secret".to_string(),
            collection: "tasks".to_string(),
        })
    }
}

/// Returns canned documents and records the directories it was called on.
pub struct FakeAssimilator {
    task_id: Value,
    documents: Mutex<Vec<Value>>,
    pub calls: Mutex<Vec<PathBuf>>,
    pub options: Mutex<Vec<IngestConfig>>,
}

impl FakeAssimilator {
    pub fn new(task_id: Value, document: Value) -> Self {
        Self::sequence(task_id, vec![document])
    }

    /// Returns `documents` in order, repeating the last one.
    pub fn sequence(task_id: Value, documents: Vec<Value>) -> Self {
        Self {
            task_id,
            documents: Mutex::new(documents),
            calls: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Assimilator for FakeAssimilator {
    async fn assimilate(
        &self,
        run_dir: &Path,
        _credentials: &Credentials,
        options: &IngestConfig,
    ) -> DomainResult<Assimilation> {
        self.calls.lock().unwrap().push(run_dir.to_path_buf());
        self.options.lock().unwrap().push(options.clone());

        let document = {
            let mut documents = self.documents.lock().unwrap();
            if documents.len() > 1 {
                documents.remove(0)
            } else {
                documents
                    .first()
                    .cloned()
                    .ok_or_else(|| DomainError::Assimilation("no document".to_string()))?
            }
        };
        Ok(Assimilation {
            task_id: ExternalId::new(self.task_id.clone()),
            document,
        })
    }
}

pub struct FailingAssimilator;

#[async_trait]
impl Assimilator for FailingAssimilator {
    async fn assimilate(
        &self,
        _run_dir: &Path,
        _credentials: &Credentials,
        _options: &IngestConfig,
    ) -> DomainResult<Assimilation> {
        Err(DomainError::Assimilation(
            "results store unreachable".to_string(),
        ))
    }
}

/// Answers with a fixed verdict and counts invocations.
pub struct FakeDiagnostic {
    unconverged: bool,
    calls: AtomicUsize,
    pub artifacts: Mutex<Vec<PathBuf>>,
}

impl FakeDiagnostic {
    pub fn new(unconverged: bool) -> Self {
        Self {
            unconverged,
            calls: AtomicUsize::new(0),
            artifacts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConvergenceDiagnostic for FakeDiagnostic {
    async fn is_unconverged(&self, output_artifact: &Path) -> DomainResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.artifacts
            .lock()
            .unwrap()
            .push(output_artifact.to_path_buf());
        Ok(self.unconverged)
    }
}

/// Records every working directory the corrective steps run in.
#[derive(Default)]
pub struct RecordingSteps {
    pub setups: Mutex<Vec<PathBuf>>,
    pub runs: Mutex<Vec<(PathBuf, TaskSpec)>>,
}

#[async_trait]
impl ConvergenceHandlerSetup for RecordingSteps {
    async fn apply(&self, working_dir: &Path) -> DomainResult<()> {
        self.setups.lock().unwrap().push(working_dir.to_path_buf());
        Ok(())
    }
}

#[async_trait]
impl CorrectiveRunner for RecordingSteps {
    async fn run(&self, working_dir: &Path, spec: &TaskSpec) -> DomainResult<()> {
        self.runs
            .lock()
            .unwrap()
            .push((working_dir.to_path_buf(), spec.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryInputWriter {
    pub written: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl InputWriter for MemoryInputWriter {
    async fn write_inputs(&self, inputs: &InputSet, _dir: &Path) -> DomainResult<Vec<String>> {
        let mut written = self.written.lock().unwrap();
        let mut names = Vec::new();
        for (name, contents) in inputs.files() {
            written.push((name.to_string(), contents.to_string()));
            names.push(name.to_string());
        }
        Ok(names)
    }
}

/// Fakes behind a [`Collaborators`] set, kept for assertions.
pub struct Fakes {
    pub assimilator: Arc<FakeAssimilator>,
    pub diagnostic: Arc<FakeDiagnostic>,
    pub steps: Arc<RecordingSteps>,
    pub inputs: Arc<MemoryInputWriter>,
}

impl Fakes {
    pub fn new(assimilator: FakeAssimilator, diagnostic: FakeDiagnostic) -> Self {
        Self {
            assimilator: Arc::new(assimilator),
            diagnostic: Arc::new(diagnostic),
            steps: Arc::new(RecordingSteps::default()),
            inputs: Arc::new(MemoryInputWriter::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            resolver: Arc::new(IdentityResolver),
            credentials: Arc::new(StaticCredentials),
            assimilator: self.assimilator.clone(),
            diagnostic: self.diagnostic.clone(),
            input_writer: self.inputs.clone(),
            handler_setup: self.steps.clone(),
            corrective_runner: self.steps.clone(),
        }
    }
}
