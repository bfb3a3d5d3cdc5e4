//! Integration tests for copying previous-run artifacts.

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use common::{temp_dir, IdentityResolver};
use vaspflow::domain::errors::DomainError;
use vaspflow::domain::models::{CopyConfig, RunHandle, TaskSpec};
use vaspflow::services::FileStager;

fn stager() -> FileStager {
    FileStager::new(Arc::new(IdentityResolver))
}

fn spec_for(dir: &Path) -> TaskSpec {
    TaskSpec {
        prev_run_dir: Some(RunHandle::from(dir)),
        ..Default::default()
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn names(files: &[&str]) -> Option<Vec<String>> {
    Some(files.iter().map(ToString::to_string).collect())
}

#[tokio::test]
async fn test_checkpoint_lands_as_structure_input_with_override() {
    let prev = temp_dir();
    let work = temp_dir();
    write(prev.path(), "INCAR", "ENCUT = 520");
    write(prev.path(), "CONTCAR", "relaxed");

    let config = CopyConfig::new(names(&["INCAR", "CONTCAR"]), true).unwrap();
    let action = stager()
        .stage(&config, &spec_for(prev.path()), work.path())
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(work.path().join("INCAR")).unwrap(), "ENCUT = 520");
    assert_eq!(fs::read_to_string(work.path().join("POSCAR")).unwrap(), "relaxed");
    assert!(!work.path().join("CONTCAR").exists());
    assert_eq!(
        action.stored_data()["copied_files"],
        serde_json::json!(["INCAR", "CONTCAR"])
    );
}

#[tokio::test]
async fn test_names_are_kept_without_override() {
    let prev = temp_dir();
    let work = temp_dir();
    write(prev.path(), "INCAR", "ENCUT = 520");
    write(prev.path(), "CONTCAR", "relaxed");

    let config = CopyConfig::new(names(&["INCAR", "CONTCAR"]), false).unwrap();
    stager()
        .stage(&config, &spec_for(prev.path()), work.path())
        .await
        .unwrap();

    assert!(work.path().join("INCAR").exists());
    assert_eq!(fs::read_to_string(work.path().join("CONTCAR")).unwrap(), "relaxed");
    assert!(!work.path().join("POSCAR").exists());
}

#[tokio::test]
async fn test_most_recent_relaxation_is_copied() {
    let prev = temp_dir();
    let work = temp_dir();
    write(prev.path(), "CONTCAR", "top level");
    write(prev.path(), "relax1/CONTCAR", "first relaxation");
    write(prev.path(), "relax2/CONTCAR", "second relaxation");

    let config = CopyConfig::new(names(&["CONTCAR"]), true).unwrap();
    stager()
        .stage(&config, &spec_for(prev.path()), work.path())
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(work.path().join("POSCAR")).unwrap(),
        "second relaxation"
    );
}

#[tokio::test]
async fn test_missing_source_is_fatal() {
    let prev = temp_dir();
    let work = temp_dir();
    write(prev.path(), "INCAR", "ENCUT = 520");

    let config = CopyConfig::new(names(&["INCAR", "KPOINTS"]), false).unwrap();
    let err = stager()
        .stage(&config, &spec_for(prev.path()), work.path())
        .await
        .unwrap_err();

    match err {
        DomainError::MissingSourceArtifact(path) => {
            assert_eq!(path, prev.path().join("KPOINTS"));
        }
        other => panic!("expected MissingSourceArtifact, got {other:?}"),
    }
}

#[tokio::test]
async fn test_all_sentinel_copies_every_file() {
    let prev = temp_dir();
    let work = temp_dir();
    write(prev.path(), "OUTCAR", "out");
    write(prev.path(), "INCAR", "in");
    fs::create_dir_all(prev.path().join("relax1")).unwrap();

    let config = CopyConfig::new(names(&["$ALL"]), false).unwrap();
    let action = stager()
        .stage(&config, &spec_for(prev.path()), work.path())
        .await
        .unwrap();

    assert!(work.path().join("OUTCAR").exists());
    assert!(work.path().join("INCAR").exists());
    assert_eq!(
        action.stored_data()["copied_files"],
        serde_json::json!(["INCAR", "OUTCAR"])
    );
}

#[tokio::test]
async fn test_missing_prev_run_dir_is_an_error() {
    let work = temp_dir();
    let err = stager()
        .stage(&CopyConfig::default(), &TaskSpec::default(), work.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::MissingSpecField("prev_run_dir")));
}
