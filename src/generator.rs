// src/generator.rs
//! Top-level generation entry point
//!
//! One request may declare several size groups. Groups are processed strictly
//! in order, each with fresh allocator state; a failing group is reported with
//! its index and never stops its siblings.

use crate::assembler::WorkloadAssembler;
use crate::config::{PlanRequest, RawRequest};
use crate::emit::{Emitted, PlanEmitter};
use crate::error::GroupError;
use crate::model::Workload;
use anyhow::Result;
use tracing::{info, warn};

/// Result of one size group
#[derive(Debug)]
pub struct GroupOutcome {
    pub index: usize,
    /// Document name, when the group's axes parsed
    pub name: Option<String>,
    pub result: std::result::Result<Emitted, GroupError>,
}

impl GroupOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-group results of one request
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub outcomes: Vec<GroupOutcome>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(GroupOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &GroupError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    pub fn emitted(&self) -> impl Iterator<Item = &Emitted> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// A planned (not yet emitted) workload of one group
#[derive(Debug)]
pub struct PlannedGroup {
    pub index: usize,
    pub name: String,
    pub workload: Workload,
}

/// Build every group's workload without emitting anything
pub fn plan(request: &PlanRequest) -> Vec<std::result::Result<PlannedGroup, GroupError>> {
    let assembler = WorkloadAssembler::new(&request.globals);

    request
        .groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let group = group.as_ref().map_err(|e| GroupError::new(index, e.clone()))?;
            let workload = assembler
                .assemble(group)
                .map_err(|e| GroupError::new(index, e))?;
            Ok(PlannedGroup {
                index,
                name: group.document_name(),
                workload,
            })
        })
        .collect()
}

/// Plan and emit every group of `request`
pub fn generate(request: &PlanRequest, emitter: &mut PlanEmitter<'_>) -> GenerationReport {
    let mode = request.globals.mode;
    info!(
        "Generating {} workload group(s) in {:?} mode",
        request.groups.len(),
        mode
    );

    let mut report = GenerationReport::default();
    for planned in plan(request) {
        let outcome = match planned {
            Ok(group) => GroupOutcome {
                index: group.index,
                result: emitter
                    .emit(mode, &group.name, &group.workload)
                    .map_err(|e| GroupError::new(group.index, e)),
                name: Some(group.name),
            },
            Err(err) => GroupOutcome {
                index: err.index,
                name: None,
                result: Err(err),
            },
        };
        if let Err(ref err) = outcome.result {
            warn!("Size group {} failed: {:#}", err.index, err.source);
        }
        report.outcomes.push(outcome);
    }
    report
}

/// Parse, validate and generate in one call
pub fn generate_from_raw(raw: &RawRequest, emitter: &mut PlanEmitter<'_>) -> Result<GenerationReport> {
    let request = raw.validate()?;
    if request.groups.is_empty() {
        warn!("Request declares no object size groups; nothing to generate");
    }
    Ok(generate(&request, emitter))
}
