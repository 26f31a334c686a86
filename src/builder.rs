// src/builder.rs
//! Per-phase stage construction
//!
//! Each phase walks the same cell sequence with its own allocator state, so
//! every phase partitions the id space from offset 0 independently.
//!
//! Addressing rules within a phase:
//! - container ranges advance once per (size pass, container bucket)
//! - object ranges advance per object bucket and restart at 1 whenever a new
//!   container range opens, since object ids are addressed inside containers

use crate::axis::{AxisExpander, Cell};
use crate::config::{GroupSpec, Globals, RatioTriple};
use crate::constants;
use crate::error::{PlanError, PlanResult};
use crate::model::{OpKind, Operation, Phase, Pick, Selector, Stage, Work};
use crate::range::{IdRange, RangeAllocator, ResourceKind};
use tracing::debug;

/// Container and object ranges of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRanges {
    pub containers: IdRange,
    pub objects: IdRange,
}

/// Allocation state of one phase pass
#[derive(Debug, Default)]
struct PhaseCursor {
    containers: RangeAllocator,
    objects: RangeAllocator,
    current: Option<IdRange>,
}

impl PhaseCursor {
    fn open_containers(&mut self, cell: &Cell) -> PlanResult<IdRange> {
        let range = self.containers.next(ResourceKind::Container, cell.containers)?;
        self.current = Some(range);
        self.objects = RangeAllocator::new();
        Ok(range)
    }

    fn advance(&mut self, cell: &Cell) -> PlanResult<CellRanges> {
        let containers = match self.current.filter(|_| !cell.opens_container_bucket()) {
            Some(range) => range,
            None => self.open_containers(cell)?,
        };
        let objects = self.objects.next(ResourceKind::Object, cell.objects)?;
        Ok(CellRanges { containers, objects })
    }
}

/// Builds the stages of each phase for one size group
#[derive(Debug)]
pub struct StagePlanBuilder<'a> {
    group: &'a GroupSpec,
    globals: &'a Globals,
    cells: Vec<Cell>,
}

impl<'a> StagePlanBuilder<'a> {
    pub fn new(group: &'a GroupSpec, globals: &'a Globals) -> Self {
        let cells =
            AxisExpander::new(&group.sizes, group.unit, &group.containers, &group.objects).expand();
        Self {
            group,
            globals,
            cells,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Ranges every cell receives, in cell order
    #[cfg(test)]
    fn cell_ranges(&self) -> PlanResult<Vec<CellRanges>> {
        let mut cursor = PhaseCursor::default();
        self.cells.iter().map(|cell| cursor.advance(cell)).collect()
    }

    /// Stages of one phase, in cell order
    pub fn build(&self, phase: Phase) -> PlanResult<Vec<Stage>> {
        let stages = match phase {
            Phase::Init | Phase::Dispose => self.container_stages(phase)?,
            Phase::Prepare => self.prepare_stages()?,
            Phase::Normal => self.normal_stages()?,
            Phase::Cleanup => self.cleanup_stages()?,
        };
        debug!(
            "Group {}: built {} {} stage(s)",
            self.group.index,
            stages.len(),
            phase
        );
        Ok(stages)
    }

    /// One stage per container bucket, single worker, containers only
    fn container_stages(&self, phase: Phase) -> PlanResult<Vec<Stage>> {
        let mut cursor = PhaseCursor::default();
        let mut stages = Vec::new();
        for cell in self.cells.iter().filter(|c| c.opens_container_bucket()) {
            let containers = cursor.open_containers(cell)?;
            let selector = Selector::containers(Pick::Sequential, containers);
            let name = format!("{}_c{}-{}", phase, containers.first(), containers.last());
            stages.push(Stage::new(
                name,
                phase_work(phase, constants::SINGLE_WORKER, &selector),
            ));
        }
        Ok(stages)
    }

    fn prepare_stages(&self) -> PlanResult<Vec<Stage>> {
        let mut cursor = PhaseCursor::default();
        let mut stages = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            let ranges = cursor.advance(cell)?;
            let name = ranged_stage_name(Phase::Prepare, &ranges);
            let workers = self.prepare_workers(cell, &name)?;
            let selector = Selector::containers(Pick::Sequential, ranges.containers)
                .with_objects(ranges.objects)
                .with_sizes(cell.size);
            stages.push(Stage::new(name, phase_work(Phase::Prepare, workers, &selector)));
        }
        Ok(stages)
    }

    fn cleanup_stages(&self) -> PlanResult<Vec<Stage>> {
        let mut cursor = PhaseCursor::default();
        let mut stages = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            let ranges = cursor.advance(cell)?;
            let selector =
                Selector::containers(Pick::Sequential, ranges.containers).with_objects(ranges.objects);
            stages.push(Stage::new(
                ranged_stage_name(Phase::Cleanup, &ranges),
                phase_work(Phase::Cleanup, constants::SINGLE_WORKER, &selector),
            ));
        }
        Ok(stages)
    }

    /// cell x worker count x ratio triple, one stage each
    fn normal_stages(&self) -> PlanResult<Vec<Stage>> {
        let mut cursor = PhaseCursor::default();
        let mut stages =
            Vec::with_capacity(self.cells.len() * self.group.workers.len() * self.group.ratios.len());
        for cell in &self.cells {
            let ranges = cursor.advance(cell)?;
            let target =
                Selector::containers(Pick::Uniform, ranges.containers).with_objects(ranges.objects);
            let write_target = target.with_sizes(cell.size);

            for workers in &self.group.workers {
                for ratios in &self.group.ratios {
                    let name = format!(
                        "w{}_c{}_o{}_{}_{}",
                        cell.size.label(),
                        ranges.containers.len(),
                        ranges.objects.len(),
                        ratios,
                        workers
                    );
                    let work = Work {
                        name: constants::NORMAL_WORK_NAME.to_string(),
                        phase: Phase::Normal,
                        workers: workers.get(),
                        rampup: Some(self.globals.rampup),
                        runtime: Some(self.globals.runtime),
                        config: None,
                        operations: normal_operations(ratios, &target, &write_target),
                    };
                    let mut stage = Stage::new(name, work);
                    stage.closure_delay = self.globals.delay;
                    stages.push(stage);
                }
            }
        }
        Ok(stages)
    }

    /// floor(objects / drivers); zero is a configuration error
    fn prepare_workers(&self, cell: &Cell, stage: &str) -> PlanResult<u32> {
        let objects = cell.objects.get();
        let drivers = self.globals.drivers.get();
        let workers = objects / drivers;
        if workers == 0 {
            return Err(PlanError::DegenerateWorkers {
                group: self.group.index,
                stage: stage.to_string(),
                objects,
                drivers,
            });
        }
        u32::try_from(workers).map_err(|_| PlanError::InvalidValue {
            field: "num_of_objects",
            reason: format!("prepare stage {} would need {} workers", stage, workers),
        })
    }
}

fn ranged_stage_name(phase: Phase, ranges: &CellRanges) -> String {
    format!(
        "{}_c{}-{}_o{}-{}",
        phase,
        ranges.containers.first(),
        ranges.containers.last(),
        ranges.objects.first(),
        ranges.objects.last()
    )
}

fn phase_work(phase: Phase, workers: u32, selector: &Selector) -> Work {
    Work {
        name: phase.to_string(),
        phase,
        workers,
        rampup: None,
        runtime: None,
        config: Some(selector.to_string()),
        operations: Vec::new(),
    }
}

fn normal_operations(ratios: &RatioTriple, target: &Selector, write_target: &Selector) -> Vec<Operation> {
    vec![
        Operation::new(OpKind::Read, ratios.read, target),
        Operation::new(OpKind::Write, ratios.write, write_target),
        Operation::new(OpKind::Delete, ratios.delete, target),
    ]
}
