//! Workload assembly: five phase passes concatenated into one validated workflow

use crate::builder::StagePlanBuilder;
use crate::config::{GroupSpec, Globals};
use crate::error::PlanResult;
use crate::model::{Phase, Workflow, Workload};
use tracing::info;

pub struct WorkloadAssembler<'a> {
    globals: &'a Globals,
}

impl<'a> WorkloadAssembler<'a> {
    pub fn new(globals: &'a Globals) -> Self {
        Self { globals }
    }

    /// Build and validate the workload of one size group
    pub fn assemble(&self, group: &GroupSpec) -> PlanResult<Workload> {
        let builder = StagePlanBuilder::new(group, self.globals);

        let mut workflow = Workflow::default();
        for phase in Phase::ALL {
            workflow.stages.extend(builder.build(phase)?);
        }

        let workload = Workload {
            name: self.globals.name.clone(),
            description: self.globals.description.clone(),
            auth: self.globals.auth.clone(),
            storage: self.globals.storage.clone(),
            workflow,
        };
        workload.validate()?;

        info!(
            "Group {} ({}): {} cell(s), {} stage(s)",
            group.index,
            group.document_name(),
            builder.cells().len(),
            workload.workflow.stages.len()
        );
        Ok(workload)
    }
}
