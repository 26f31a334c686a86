// src/model.rs
//! Workload document model
//!
//! A `Workload` carries one `Workflow`: init, prepare, normal, cleanup and
//! dispose stages in that order. Each stage holds one `Work`. Normal works
//! carry read/write/delete `Operation`s; every other phase carries a single
//! selector config string instead.

use crate::error::{PlanError, PlanResult};
use crate::range::IdRange;
use crate::size::SizeExpr;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Pipeline phase; declaration order is workflow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Prepare,
    Normal,
    Cleanup,
    Dispose,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Init,
        Phase::Prepare,
        Phase::Normal,
        Phase::Cleanup,
        Phase::Dispose,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Prepare => "prepare",
            Phase::Normal => "normal",
            Phase::Cleanup => "cleanup",
            Phase::Dispose => "dispose",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Read,
    Write,
    Delete,
}

/// How ids are picked from a range at execution time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pick {
    /// `r(a,b)`: walk the range sequentially, each id once
    Sequential,
    /// `u(a,b)`: draw uniformly from the range
    Uniform,
}

impl Pick {
    fn prefix(self) -> char {
        match self {
            Pick::Sequential => 'r',
            Pick::Uniform => 'u',
        }
    }
}

/// Target expression of a work or operation
///
/// Printed as `containers=r(1,2);objects=r(1,5);sizes=c(1)KB`, with the
/// objects and sizes parts optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub pick: Pick,
    pub containers: IdRange,
    pub objects: Option<IdRange>,
    pub sizes: Option<SizeExpr>,
}

impl Selector {
    pub fn containers(pick: Pick, containers: IdRange) -> Self {
        Self {
            pick,
            containers,
            objects: None,
            sizes: None,
        }
    }

    pub fn with_objects(mut self, objects: IdRange) -> Self {
        self.objects = Some(objects);
        self
    }

    pub fn with_sizes(mut self, sizes: SizeExpr) -> Self {
        self.sizes = Some(sizes);
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.pick.prefix();
        write!(f, "containers={}{}", p, self.containers)?;
        if let Some(objects) = self.objects {
            write!(f, ";objects={}{}", p, objects)?;
        }
        if let Some(sizes) = self.sizes {
            write!(f, ";sizes={}", sizes)?;
        }
        Ok(())
    }
}

fn parse_range(expr: &str) -> Option<(Pick, IdRange)> {
    let pick = match expr.chars().next()? {
        'r' => Pick::Sequential,
        'u' => Pick::Uniform,
        _ => return None,
    };
    let body = expr[1..].strip_prefix('(')?.strip_suffix(')')?;
    let (first, last) = body.split_once(',')?;
    let range = IdRange::new(first.trim().parse().ok()?, last.trim().parse().ok()?)?;
    Some((pick, range))
}

impl FromStr for Selector {
    type Err = PlanError;

    fn from_str(s: &str) -> PlanResult<Self> {
        let invalid = || PlanError::InvalidSelector(s.to_string());

        let mut containers = None;
        let mut objects = None;
        let mut sizes = None;
        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(invalid)?;
            match key.trim() {
                "containers" if containers.is_none() => {
                    containers = Some(parse_range(value.trim()).ok_or_else(invalid)?)
                }
                "objects" if objects.is_none() => {
                    objects = Some(parse_range(value.trim()).ok_or_else(invalid)?)
                }
                "sizes" if sizes.is_none() => {
                    sizes = Some(value.parse::<SizeExpr>().map_err(|_| invalid())?)
                }
                _ => return Err(invalid()),
            }
        }

        let (pick, containers) = containers.ok_or_else(invalid)?;
        let objects = match objects {
            Some((object_pick, range)) if object_pick == pick => Some(range),
            Some(_) => return Err(invalid()),
            None => None,
        };
        Ok(Selector {
            pick,
            containers,
            objects,
            sizes,
        })
    }
}

/// One I/O action inside a normal-phase work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OpKind,
    /// Percent of operations; the three ratios of a work are not required to sum to 100
    pub ratio: u32,
    pub config: String,
}

impl Operation {
    pub fn new(kind: OpKind, ratio: u32, selector: &Selector) -> Self {
        Self {
            kind,
            ratio,
            config: selector.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub name: String,
    #[serde(rename = "type")]
    pub phase: Phase,
    pub workers: u32,
    /// Ramp-up seconds (normal phase only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rampup: Option<u64>,
    /// Runtime seconds (normal phase only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u64>,
    /// Selector string (every phase except normal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    /// Seconds to wait before the stage starts
    #[serde(default, rename = "closuredelay")]
    pub closure_delay: u64,
    pub works: Vec<Work>,
}

impl Stage {
    pub fn new(name: impl Into<String>, work: Work) -> Self {
        Self {
            name: name.into(),
            closure_delay: 0,
            works: vec![work],
        }
    }

    /// Phase of the stage's first work
    pub fn phase(&self) -> Option<Phase> {
        self.works.first().map(|w| w.phase)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub stages: Vec<Stage>,
}

impl Workflow {
    pub fn stages_in(&self, phase: Phase) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(move |s| s.phase() == Some(phase))
    }
}

/// Opaque auth endpoint descriptor, passed through unmodified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: String,
}

/// Opaque storage endpoint descriptor, passed through unmodified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub auth: Auth,
    pub storage: Storage,
    pub workflow: Workflow,
}

impl Workload {
    /// Structural validation run before any emission
    pub fn validate(&self) -> PlanResult<()> {
        let invalid = |msg: String| Err(PlanError::InvalidWorkload(msg));

        if self.name.trim().is_empty() {
            return invalid("workload name is empty".into());
        }
        if self.auth.kind.trim().is_empty() {
            return invalid("auth type is empty".into());
        }
        if self.storage.kind.trim().is_empty() {
            return invalid("storage type is empty".into());
        }
        if self.workflow.stages.is_empty() {
            return invalid("workflow has no stages".into());
        }

        let mut names = HashSet::new();
        let mut last_phase = Phase::Init;
        for stage in &self.workflow.stages {
            if !names.insert(stage.name.as_str()) {
                return invalid(format!("duplicate stage name '{}'", stage.name));
            }
            if stage.works.is_empty() {
                return invalid(format!("stage '{}' has no works", stage.name));
            }
            for work in &stage.works {
                validate_work(&stage.name, work)?;
            }
            let phase = stage.works[0].phase;
            if stage.works.iter().any(|w| w.phase != phase) {
                return invalid(format!("stage '{}' mixes work types", stage.name));
            }
            if phase < last_phase {
                return invalid(format!(
                    "stage '{}' ({}) appears after a {} stage",
                    stage.name, phase, last_phase
                ));
            }
            last_phase = phase;
        }
        Ok(())
    }
}

fn validate_work(stage: &str, work: &Work) -> PlanResult<()> {
    let invalid = |msg: String| Err(PlanError::InvalidWorkload(format!("stage '{}': {}", stage, msg)));

    if work.workers == 0 {
        return invalid(format!("work '{}' has 0 workers", work.name));
    }
    match work.phase {
        Phase::Normal => {
            if work.operations.is_empty() {
                return invalid(format!("normal work '{}' has no operations", work.name));
            }
            for op in &work.operations {
                if op.ratio > crate::constants::MAX_RATIO {
                    return invalid(format!("{:?} ratio {} exceeds 100", op.kind, op.ratio));
                }
                op.config.parse::<Selector>()?;
            }
        }
        _ => {
            if !work.operations.is_empty() {
                return invalid(format!("{} work '{}' carries operations", work.phase, work.name));
            }
            match &work.config {
                Some(config) => {
                    config.parse::<Selector>()?;
                }
                None => return invalid(format!("{} work '{}' has no config", work.phase, work.name)),
            }
        }
    }
    Ok(())
}
