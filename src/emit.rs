// src/emit.rs
//! Workload document emission
//!
//! A finished workload goes to exactly one place per size group:
//! - persist: `{output_dir}/objSizes-{sizes}{unit}.yaml`
//! - submit: handed to the controller, then started by id
//!
//! Persisted files are written to a temp file and renamed into place, so
//! concurrent identical requests resolve as last-writer-wins with no torn files.

use crate::config::EmitMode;
use crate::constants;
use crate::error::PlanError;
use crate::model::Workload;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Serialize a workload into its document form
pub fn to_document(workload: &Workload) -> Result<String> {
    serde_yaml::to_string(workload).context("Failed to serialize workload document")
}

/// Parse a document produced by `to_document`
pub fn from_document(document: &str) -> Result<Workload> {
    serde_yaml::from_str(document).context("Failed to parse workload document")
}

/// Accepts submitted documents and starts them
pub trait SubmissionSink {
    /// Hand over a document; returns the identifier the controller assigned
    fn submit(&mut self, document: &str) -> Result<String>;

    /// Start a previously submitted workload
    fn fire(&mut self, id: &str) -> Result<()>;
}

/// Output directory for persisted documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Open the store, creating the directory if needed (idempotent)
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let shown = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        info!("Using {} for storing generated workload configs", shown.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", name, constants::DOCUMENT_EXTENSION))
    }

    /// Write `document` under `name`, replacing any previous file atomically
    pub fn write(&self, name: &str, document: &str) -> Result<PathBuf> {
        let path = self.path_for(name);
        let tmp = self.dir.join(format!(
            ".{}.{}-{}.tmp",
            name,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        fs::write(&tmp, document)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to move document into {}", path.display()));
        }
        Ok(path)
    }
}

/// Controller reachable over HTTP
///
/// `POST {base}/submit` with the document as body returns the workload id;
/// `POST {base}/fire?id={id}` starts it.
#[derive(Debug, Clone)]
pub struct ControllerClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl ControllerClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = base_url.trim().trim_end_matches('/').to_string();
        if base.is_empty() {
            bail!("Controller URL is empty");
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(constants::CONTROLLER_TIMEOUT_SECS))
            .build()
            .context("Failed to build controller HTTP client")?;
        Ok(Self { base, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }
}

impl SubmissionSink for ControllerClient {
    fn submit(&mut self, document: &str) -> Result<String> {
        let url = self.url(constants::CONTROLLER_SUBMIT_PATH);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-yaml")
            .body(document.to_string())
            .send()
            .with_context(|| format!("Failed to reach controller at {}", url))?
            .error_for_status()
            .context("Controller rejected workload")?;

        let id = response
            .text()
            .context("Failed to read controller response")?
            .trim()
            .to_string();
        if id.is_empty() {
            bail!("Controller returned an empty workload id");
        }
        Ok(id)
    }

    fn fire(&mut self, id: &str) -> Result<()> {
        let url = self.url(constants::CONTROLLER_FIRE_PATH);
        self.http
            .post(&url)
            .query(&[("id", id)])
            .send()
            .with_context(|| format!("Failed to reach controller at {}", url))?
            .error_for_status()
            .with_context(|| format!("Controller failed to start workload {}", id))?;
        Ok(())
    }
}

/// Where one workload ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Persisted(PathBuf),
    Submitted(String),
}

/// Routes workloads to the document store or the submission sink
#[derive(Default)]
pub struct PlanEmitter<'a> {
    store: Option<DocumentStore>,
    sink: Option<&'a mut dyn SubmissionSink>,
}

impl<'a> PlanEmitter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_sink(mut self, sink: &'a mut dyn SubmissionSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Serialize `workload` and send it to the destination `mode` selects
    pub fn emit(&mut self, mode: EmitMode, name: &str, workload: &Workload) -> Result<Emitted> {
        let document = to_document(workload)?;

        match mode {
            EmitMode::Persist => {
                let store = self.store.as_ref().ok_or_else(|| {
                    PlanError::Emit("persist mode requested but no output directory is configured".into())
                })?;
                let path = store.write(name, &document)?;
                info!("Wrote workload config: {}", path.display());
                Ok(Emitted::Persisted(path))
            }
            EmitMode::Submit => {
                let sink = self.sink.as_mut().ok_or_else(|| {
                    PlanError::Emit("submit mode requested but no controller is configured".into())
                })?;
                let id = sink
                    .submit(&document)
                    .with_context(|| format!("Failed to submit {}", name))?;
                debug!("Submitted {} as {}", name, id);
                sink.fire(&id)
                    .with_context(|| format!("Failed to start {} ({})", name, id))?;
                info!("Submitted and started workload {} ({})", id, name);
                Ok(Emitted::Submitted(id))
            }
        }
    }
}
