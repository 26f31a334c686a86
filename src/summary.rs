// Plan summary display for `workgen summary` (dry run)
// Shows what each size group would generate without writing or submitting anything

use crate::config::{EmitMode, GroupSpec, Globals, PlanRequest};
use crate::generator::{plan, PlannedGroup};
use crate::model::Phase;
use crate::size::SizeExpr;

/// Figures describing one planned group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: String,
    pub cells: usize,
    /// Stage count per phase, in workflow order
    pub stages: [(Phase, usize); 5],
    /// Containers created across all size passes
    pub containers: u64,
    /// Objects written by the prepare stages
    pub objects: u64,
    /// Upper bound of prepared data in bytes
    pub max_bytes: u64,
}

impl GroupSummary {
    pub fn new(group: &GroupSpec, planned: &PlannedGroup) -> Self {
        let stages = Phase::ALL.map(|phase| (phase, planned.workload.workflow.stages_in(phase).count()));

        let objects_per_container: u64 = group.objects.iter().map(|o| o.get()).sum();
        let mut containers = 0u64;
        let mut objects = 0u64;
        let mut max_bytes = 0u64;
        for size in group.sizes.expressions(group.unit) {
            for c in &group.containers {
                let pass_objects = c.get().saturating_mul(objects_per_container);
                containers = containers.saturating_add(c.get());
                objects = objects.saturating_add(pass_objects);
                max_bytes = max_bytes.saturating_add(pass_objects.saturating_mul(size.max_bytes()));
            }
        }

        Self {
            name: planned.name.clone(),
            cells: group.sizes.passes() * group.containers.len() * group.objects.len(),
            stages,
            containers,
            objects,
            max_bytes,
        }
    }

    pub fn total_stages(&self) -> usize {
        self.stages.iter().map(|(_, n)| n).sum()
    }
}

/// Format bytes with decimal units, matching the size axis units
fn format_bytes(bytes: u64) -> (f64, &'static str) {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    (value, UNITS[unit])
}

fn size_description(size: &SizeExpr) -> String {
    match size {
        SizeExpr::Constant { value, unit } => format!("{} {} (constant)", value, unit),
        SizeExpr::Uniform { lo, hi, unit } => format!("{}-{} {} (uniform)", lo, hi, unit),
    }
}

fn display_globals(globals: &Globals, request_path: &str) {
    println!("╔═══════════════════════════════════════════════════════════════════════╗");
    println!("║           WORKLOAD PLAN SUMMARY (DRY RUN)                            ║");
    println!("╚═══════════════════════════════════════════════════════════════════════╝");
    println!();
    println!("✅ Request parsed successfully: {}", request_path);
    println!();
    println!("┌─ Request Settings ───────────────────────────────────────────────────┐");
    println!("│ Workload:     {} ({})", globals.name, globals.description);
    println!("│ Auth:         {}", globals.auth.kind);
    println!("│ Storage:      {}", globals.storage.kind);
    println!("│ Runtime:      {}s (ramp-up {}s, delay {}s)", globals.runtime, globals.rampup, globals.delay);
    println!("│ Drivers:      {}", globals.drivers);
    let mode = match globals.mode {
        EmitMode::Persist => "persist (write documents)",
        EmitMode::Submit => "submit (hand to controller and start)",
    };
    println!("│ Mode:         {}", mode);
    println!("└──────────────────────────────────────────────────────────────────────┘");
    println!();
}

/// Print the summary of every group; returns false if any group failed to plan
pub fn display_plan_summary(request: &PlanRequest, request_path: &str) -> bool {
    display_globals(&request.globals, request_path);

    let mut ok = true;
    for planned in plan(request) {
        let planned = match planned {
            Ok(planned) => planned,
            Err(err) => {
                ok = false;
                println!("❌ Size group {}: {:#}", err.index, err.source);
                println!();
                continue;
            }
        };
        // plan() only succeeds for groups that parsed
        let Some(Ok(group)) = request.groups.get(planned.index) else {
            continue;
        };
        let summary = GroupSummary::new(group, &planned);

        println!("┌─ Size Group {} ─────────────────────────────────────────────────────┐", planned.index);
        println!("│ Document:     {}", summary.name);
        for size in group.sizes.expressions(group.unit) {
            println!("│ Size:         {}", size_description(&size));
        }
        println!("│ Cells:        {} (containers {:?} x objects {:?})",
            summary.cells,
            group.containers.iter().map(|c| c.get()).collect::<Vec<_>>(),
            group.objects.iter().map(|o| o.get()).collect::<Vec<_>>());
        println!("│ Workers:      {:?}", group.workers.iter().map(|w| w.get()).collect::<Vec<_>>());
        let prepare_workers: Vec<u32> = planned
            .workload
            .workflow
            .stages_in(Phase::Prepare)
            .filter_map(|s| s.works.first().map(|w| w.workers))
            .collect();
        println!("│ Prepare:      {:?} worker(s) per cell", prepare_workers);
        for triple in &group.ratios {
            let note = if triple.total() == 100 { "" } else { "  (does not sum to 100)" };
            println!("│ Mix:          {}{}", triple, note);
        }
        println!("│");
        println!("│ Stages:       {} total", summary.total_stages());
        for (phase, count) in summary.stages {
            println!("│   {:<10} {}", phase, count);
        }
        println!("│");
        println!("│ Containers:   {}", summary.containers);
        println!("│ Objects:      {}", summary.objects);
        let (value, unit) = format_bytes(summary.max_bytes);
        println!("│ Max Data:     {} bytes ({:.2} {})", summary.max_bytes, value, unit);
        println!("└──────────────────────────────────────────────────────────────────────┘");
        println!();
    }
    ok
}
