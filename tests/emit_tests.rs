// tests/emit_tests.rs
use anyhow::{bail, Result};
use std::fs;
use tempfile::TempDir;
use workgen::emit::{from_document, Emitted};
use workgen::error::PlanError;
use workgen::model::Phase;
use workgen::{generate_from_raw, DocumentStore, PlanEmitter, RawRequest, SubmissionSink};

const MULTI_GROUP: &str = r#"
auth: { type: swauth, config: "username=test:tester;password=testing" }
storage: { type: swift }
runtime: 30s
delay: 5
rampup: 10
num_of_drivers: 4
generate_workload: true
object_sizes: ["1,4", "8", "1-64"]
object_size_units: [KB, MB, KB]
num_of_containers: ["2", "1", "1,2"]
num_of_objects: ["8", "2", "100"]
workers: ["4", "1", "8,16"]
ratios:
  - { read: [80], write: [20], delete: [0] }
  - { read: [100], write: [0], delete: [0] }
  - { read: [50, 70], write: [50, 20], delete: [0, 10] }
"#;

/// Records every submission and start in order
#[derive(Default)]
struct RecordingSink {
    documents: Vec<String>,
    fired: Vec<String>,
    reject_after: Option<usize>,
}

impl SubmissionSink for RecordingSink {
    fn submit(&mut self, document: &str) -> Result<String> {
        if let Some(limit) = self.reject_after {
            if self.documents.len() >= limit {
                bail!("controller queue full");
            }
        }
        self.documents.push(document.to_string());
        Ok(format!("w{}", self.documents.len()))
    }

    fn fire(&mut self, id: &str) -> Result<()> {
        self.fired.push(id.to_string());
        Ok(())
    }
}

#[test]
fn test_persist_mode_reports_failures_per_group() {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path().join("workload-configs")).unwrap();
    let mut emitter = PlanEmitter::new().with_store(store);

    let raw = RawRequest::from_yaml_str(MULTI_GROUP).unwrap();
    let report = generate_from_raw(&raw, &mut emitter).unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(!report.is_success());

    // group 1: 2 objects across 4 drivers leaves prepare with no workers
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 1);
    assert!(matches!(
        failures[0].source.downcast_ref::<PlanError>(),
        Some(PlanError::DegenerateWorkers { objects: 2, drivers: 4, .. })
    ));

    let dir = temp_dir.path().join("workload-configs");
    assert!(dir.join("objSizes-1,4KB.yaml").exists());
    assert!(!dir.join("objSizes-8MB.yaml").exists());
    assert!(dir.join("objSizes-1-64KB.yaml").exists());

    let doc = fs::read_to_string(dir.join("objSizes-1-64KB.yaml")).unwrap();
    let wl = from_document(&doc).unwrap();
    assert_eq!(wl.auth.kind, "swauth");
    assert_eq!(wl.workflow.stages_in(Phase::Normal).count(), 2 * 2 * 2);
    let normal = wl.workflow.stages_in(Phase::Normal).next().unwrap();
    assert_eq!(normal.closure_delay, 5);
    assert_eq!(normal.works[0].runtime, Some(30));
    assert_eq!(normal.works[0].rampup, Some(10));
}

#[test]
fn test_submit_mode_fires_each_document() {
    let yaml = MULTI_GROUP
        .replace("generate_workload: true\n", "")
        .replace("num_of_drivers: 4", "num_of_drivers: 1");
    let raw = RawRequest::from_yaml_str(&yaml).unwrap();

    let mut sink = RecordingSink::default();
    let report = {
        let mut emitter = PlanEmitter::new().with_sink(&mut sink);
        generate_from_raw(&raw, &mut emitter).unwrap()
    };

    assert!(report.is_success());
    let ids: Vec<&Emitted> = report.emitted().collect();
    assert_eq!(
        ids,
        vec![
            &Emitted::Submitted("w1".into()),
            &Emitted::Submitted("w2".into()),
            &Emitted::Submitted("w3".into()),
        ]
    );
    assert_eq!(sink.fired, vec!["w1", "w2", "w3"]);
    assert!(from_document(&sink.documents[0]).unwrap().validate().is_ok());
}

#[test]
fn test_submit_rejection_does_not_stop_siblings() {
    let yaml = MULTI_GROUP
        .replace("generate_workload: true\n", "")
        .replace("num_of_drivers: 4", "num_of_drivers: 1");
    let raw = RawRequest::from_yaml_str(&yaml).unwrap();

    let mut sink = RecordingSink {
        reject_after: Some(1),
        ..Default::default()
    };
    let report = {
        let mut emitter = PlanEmitter::new().with_sink(&mut sink);
        generate_from_raw(&raw, &mut emitter).unwrap()
    };

    let failed: Vec<usize> = report.failures().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 2]);
    assert_eq!(sink.fired, vec!["w1"]);
}

#[test]
fn test_invalid_identity_emits_nothing() {
    let yaml = MULTI_GROUP.replace("storage: { type: swift }\n", "");
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path()).unwrap();
    let mut emitter = PlanEmitter::new().with_store(store);

    let raw = RawRequest::from_yaml_str(&yaml).unwrap();
    let report = generate_from_raw(&raw, &mut emitter).unwrap();

    assert_eq!(report.failures().count(), 3);
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_request_level_error_aborts() {
    let yaml = MULTI_GROUP.replace("runtime: 30s\n", "");
    let raw = RawRequest::from_yaml_str(&yaml).unwrap();
    let mut emitter = PlanEmitter::new();
    let err = generate_from_raw(&raw, &mut emitter).unwrap_err();
    assert!(err.to_string().contains("runtime"));
}

#[test]
fn test_persist_write_failure_does_not_stop_siblings() {
    let yaml = MULTI_GROUP.replace("num_of_drivers: 4", "num_of_drivers: 1");
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("workload-configs");
    let store = DocumentStore::open(&dir).unwrap();
    // a directory in the way makes the rename for group 1 fail
    fs::create_dir(dir.join("objSizes-8MB.yaml")).unwrap();
    let mut emitter = PlanEmitter::new().with_store(store);

    let raw = RawRequest::from_yaml_str(&yaml).unwrap();
    let report = generate_from_raw(&raw, &mut emitter).unwrap();

    let failed: Vec<usize> = report.failures().map(|f| f.index).collect();
    assert_eq!(failed, vec![1]);
    assert!(dir.join("objSizes-1,4KB.yaml").is_file());
    assert!(dir.join("objSizes-1-64KB.yaml").is_file());
    assert!(dir.join("objSizes-8MB.yaml").is_dir());

    // no temp files left behind
    let entries: Vec<String> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 3, "unexpected entries: {:?}", entries);
}

#[test]
fn test_groups_naming_the_same_document_are_rejected() {
    let yaml = r#"
auth: { type: none }
storage: { type: mock }
runtime: 60
num_of_drivers: 1
generate_workload: true
object_sizes: ["1", " 1 "]
object_size_units: [KB, k]
num_of_containers: ["2", "3"]
num_of_objects: ["5", "7"]
workers: ["1", "1"]
ratios:
  - { read: [100], write: [0], delete: [0] }
  - { read: [100], write: [0], delete: [0] }
"#;
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path()).unwrap();
    let mut emitter = PlanEmitter::new().with_store(store);

    let raw = RawRequest::from_yaml_str(yaml).unwrap();
    let report = generate_from_raw(&raw, &mut emitter).unwrap();

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 1);
    assert!(matches!(
        failures[0].source.downcast_ref::<PlanError>(),
        Some(PlanError::MalformedAxis { group: 1, axis: "object_sizes", .. })
    ));

    // the first group's document is the one on disk
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    let doc = fs::read_to_string(temp_dir.path().join("objSizes-1KB.yaml")).unwrap();
    let wl = from_document(&doc).unwrap();
    let prepare = wl.workflow.stages_in(Phase::Prepare).next().unwrap();
    assert_eq!(prepare.name, "prepare_c1-2_o1-5");
}
