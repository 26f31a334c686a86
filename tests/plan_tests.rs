// tests/plan_tests.rs
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::num::{NonZeroU32, NonZeroU64};
use workgen::assembler::WorkloadAssembler;
use workgen::config::{EmitMode, Globals, GroupSpec, RatioTriple, RawRequest};
use workgen::emit::{from_document, to_document};
use workgen::model::{Auth, OpKind, Phase, Selector, Stage, Storage, Workload};
use workgen::range::{IdRange, RangeAllocator, ResourceKind};
use workgen::size::{SizeAxis, SizeUnit};

const EXAMPLE: &str = r#"
auth: { type: none, config: "" }
storage: { type: mock, config: "delay=1" }
runtime: 60
num_of_drivers: 2
generate_workload: true
object_sizes: ["1"]
object_size_units: [KB]
num_of_containers: ["2,3"]
num_of_objects: ["5"]
workers: ["4"]
ratios:
  - { read: [70], write: [20], delete: [10] }
"#;

fn example_workload() -> Workload {
    let request = RawRequest::from_yaml_str(EXAMPLE).unwrap().validate().unwrap();
    let group = request.groups[0].as_ref().unwrap();
    WorkloadAssembler::new(&request.globals).assemble(group).unwrap()
}

fn selector(stage: &Stage) -> Selector {
    stage.works[0].config.as_deref().unwrap().parse().unwrap()
}

fn range(first: u64, last: u64) -> IdRange {
    IdRange::new(first, last).unwrap()
}

fn stages(workload: &Workload, phase: Phase) -> Vec<&Stage> {
    workload.workflow.stages_in(phase).collect()
}

#[test]
fn test_end_to_end_example() {
    let wl = example_workload();
    assert_eq!(wl.workflow.stages.len(), 10);

    let init = stages(&wl, Phase::Init);
    assert_eq!(init.len(), 2);
    assert_eq!(selector(init[0]).containers, range(1, 2));
    assert_eq!(selector(init[1]).containers, range(3, 5));
    assert!(init.iter().all(|s| s.works[0].workers == 1));

    let prepare = stages(&wl, Phase::Prepare);
    assert_eq!(prepare.len(), 2);
    for (stage, containers) in prepare.iter().zip([range(1, 2), range(3, 5)]) {
        let sel = selector(stage);
        assert_eq!(sel.containers, containers);
        assert_eq!(sel.objects, Some(range(1, 5)));
        assert_eq!(stage.works[0].workers, 2);
        assert_eq!(sel.sizes.unwrap().to_string(), "c(1)KB");
    }

    let normal = stages(&wl, Phase::Normal);
    assert_eq!(normal.len(), 2);
    for stage in &normal {
        assert_eq!(stage.works.len(), 1);
        let work = &stage.works[0];
        assert_eq!(work.workers, 4);
        assert_eq!(work.runtime, Some(60));
        let ratios: Vec<(OpKind, u32)> = work.operations.iter().map(|o| (o.kind, o.ratio)).collect();
        assert_eq!(ratios, vec![(OpKind::Read, 70), (OpKind::Write, 20), (OpKind::Delete, 10)]);
    }
    assert_eq!(normal[0].name, "w(1)KB_c2_o5_r70w20d10_4");
    assert_eq!(normal[1].name, "w(1)KB_c3_o5_r70w20d10_4");

    let cleanup = stages(&wl, Phase::Cleanup);
    assert_eq!(cleanup.len(), 2);
    for (c, p) in cleanup.iter().zip(&prepare) {
        assert_eq!(selector(c).containers, selector(p).containers);
        assert_eq!(selector(c).objects, selector(p).objects);
    }

    let dispose = stages(&wl, Phase::Dispose);
    assert_eq!(dispose.len(), 2);
    for (d, i) in dispose.iter().zip(&init) {
        assert_eq!(selector(d), selector(i));
    }
}

#[test]
fn test_identity_passed_through() {
    let wl = example_workload();
    assert_eq!(wl.name, "workload");
    assert_eq!(wl.description, "workload description");
    assert_eq!(wl.storage.kind, "mock");
    assert_eq!(wl.storage.config, "delay=1");
}

#[test]
fn test_document_round_trip_preserves_plan() {
    let wl = example_workload();
    let parsed = from_document(&to_document(&wl).unwrap()).unwrap();

    assert_eq!(parsed.workflow.stages.len(), wl.workflow.stages.len());
    for (a, b) in parsed.workflow.stages.iter().zip(&wl.workflow.stages) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.works, b.works);
    }
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_range_size_single_pass() {
    let yaml = EXAMPLE
        .replace("object_sizes: [\"1\"]", "object_sizes: [\"1-64\"]")
        .replace("num_of_objects: [\"5\"]", "num_of_objects: [\"5,10\"]");
    let request = RawRequest::from_yaml_str(&yaml).unwrap().validate().unwrap();
    let group = request.groups[0].as_ref().unwrap();
    let wl = WorkloadAssembler::new(&request.globals).assemble(group).unwrap();

    assert_eq!(stages(&wl, Phase::Init).len(), 2);
    assert_eq!(stages(&wl, Phase::Prepare).len(), 4);
    for stage in stages(&wl, Phase::Prepare) {
        assert_eq!(selector(stage).sizes.unwrap().to_string(), "u(1,64)KB");
    }
    assert!(stages(&wl, Phase::Normal)
        .iter()
        .all(|s| s.name.starts_with("w(1,64)KB_")));
}

#[test]
fn test_discrete_sizes_expand_cells() {
    let yaml = EXAMPLE.replace("object_sizes: [\"1\"]", "object_sizes: [\"1,4\"]");
    let request = RawRequest::from_yaml_str(&yaml).unwrap().validate().unwrap();
    let group = request.groups[0].as_ref().unwrap();
    let wl = WorkloadAssembler::new(&request.globals).assemble(group).unwrap();

    let init: Vec<IdRange> = stages(&wl, Phase::Init).iter().map(|s| selector(s).containers).collect();
    assert_eq!(init, vec![range(1, 2), range(3, 5), range(6, 7), range(8, 10)]);

    let names: Vec<&str> = stages(&wl, Phase::Normal).iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "w(1)KB_c2_o5_r70w20d10_4",
            "w(1)KB_c3_o5_r70w20d10_4",
            "w(4)KB_c2_o5_r70w20d10_4",
            "w(4)KB_c3_o5_r70w20d10_4",
        ]
    );
}

fn globals() -> Globals {
    Globals {
        name: "workload".into(),
        description: String::new(),
        auth: Auth { kind: "none".into(), config: String::new() },
        storage: Storage { kind: "mock".into(), config: String::new() },
        runtime: 10,
        delay: 0,
        rampup: 0,
        drivers: NonZeroU64::new(1).unwrap(),
        mode: EmitMode::Persist,
    }
}

fn nz64(values: &BTreeSet<u64>) -> Vec<NonZeroU64> {
    values.iter().map(|&v| NonZeroU64::new(v).unwrap()).collect()
}

proptest! {
    #[test]
    fn prop_container_ranges_partition_id_space(counts in prop::collection::vec(1u64..1000, 1..20)) {
        let mut alloc = RangeAllocator::new();
        let ranges: Vec<IdRange> = counts
            .iter()
            .map(|&c| alloc.next(ResourceKind::Container, NonZeroU64::new(c).unwrap()).unwrap())
            .collect();

        prop_assert_eq!(ranges[0].first(), 1);
        for pair in ranges.windows(2) {
            prop_assert!(!pair[0].overlaps(&pair[1]));
            prop_assert_eq!(pair[1].first(), pair[0].last() + 1);
        }
        for (r, &c) in ranges.iter().zip(&counts) {
            prop_assert_eq!(r.len(), c);
        }
        let total: u64 = counts.iter().sum();
        prop_assert_eq!(ranges.last().unwrap().last(), total);
    }

    #[test]
    fn prop_phase_order_and_cardinality(
        sizes in prop::collection::btree_set(1u64..100, 1..4),
        containers in prop::collection::btree_set(1u64..20, 1..4),
        objects in prop::collection::btree_set(1u64..50, 1..4),
        workers in prop::collection::btree_set(1u32..64, 1..3),
        reads in prop::collection::btree_set(0u32..=100, 1..3),
    ) {
        let group = GroupSpec {
            index: 0,
            sizes: SizeAxis::Discrete(sizes.iter().copied().collect()),
            unit: SizeUnit::KB,
            containers: nz64(&containers),
            objects: nz64(&objects),
            workers: workers.iter().map(|&w| NonZeroU32::new(w).unwrap()).collect(),
            ratios: reads
                .iter()
                .map(|&r| RatioTriple { read: r, write: 100 - r, delete: 0 })
                .collect(),
        };
        let gl = globals();
        let wl = WorkloadAssembler::new(&gl).assemble(&group).unwrap();

        let phases: Vec<Phase> = wl.workflow.stages.iter().filter_map(|s| s.phase()).collect();
        prop_assert!(phases.windows(2).all(|w| w[0] <= w[1]));

        let cells = sizes.len() * containers.len() * objects.len();
        let count = |p: Phase| wl.workflow.stages_in(p).count();
        prop_assert_eq!(count(Phase::Normal), cells * workers.len() * reads.len());
        prop_assert_eq!(count(Phase::Init), sizes.len() * containers.len());
        prop_assert_eq!(count(Phase::Dispose), sizes.len() * containers.len());
        prop_assert_eq!(count(Phase::Prepare), cells);
        prop_assert_eq!(count(Phase::Cleanup), cells);

        // init container ranges are disjoint and increasing
        let init: Vec<IdRange> = wl
            .workflow
            .stages_in(Phase::Init)
            .map(|s| s.works[0].config.as_deref().unwrap().parse::<Selector>().unwrap().containers)
            .collect();
        for pair in init.windows(2) {
            prop_assert_eq!(pair[1].first(), pair[0].last() + 1);
        }
    }
}
