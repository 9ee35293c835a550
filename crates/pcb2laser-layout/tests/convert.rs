use approx::assert_relative_eq;
use pcb2laser_export::{CutLayer, JobItem};
use pcb2laser_geometry::{Kernel, KernelOptions};
use pcb2laser_layout::{Conversion, Layout, Settings, convert};

fn run(yaml: &str, settings: &Settings) -> Conversion {
    let layout = Layout::from_yaml_str(yaml).unwrap();
    let kernel = Kernel::new(KernelOptions::default());
    convert(&layout, settings, &kernel)
}

fn count_on(conv: &Conversion, layer: CutLayer) -> usize {
    conv.job.items_on(layer).count()
}

const TWO_PADS: &str = r#"
board:
  outline: [[-5, -5], [15, -5], [15, 5], [-5, 5]]
pads:
  - at: [0, 0]
    shape: rect
    size: [2, 2]
    net: A
  - at: [10, 0]
    shape: rect
    size: [2, 2]
    net: A
traces:
  - net: A
    width: 0.5
    points: [[0, 0], [10, 0]]
"#;

#[test]
fn pads_joined_by_a_trace_become_one_island() {
    let conv = run(TWO_PADS, &Settings::default());
    assert_eq!(conv.report.merged_nets, 1);
    assert_eq!(conv.report.merge_fallbacks, 0);
    assert_eq!(count_on(&conv, CutLayer::TopCopper), 1);
    assert_eq!(count_on(&conv, CutLayer::BottomCopper), 0);

    let area: f64 = conv
        .job
        .contours_on(CutLayer::TopCopper)
        .iter()
        .map(|c| c.signed_area())
        .sum();
    assert_relative_eq!(area, 12.0, epsilon = 1e-6);
}

#[test]
fn board_outline_is_emitted_first() {
    let conv = run(TWO_PADS, &Settings::default());
    let first = &conv.job.items()[0];
    assert_eq!(first.layer(), CutLayer::BoardOutline);
    assert!(matches!(first, JobItem::Path(p) if p.closed));
    assert_eq!(conv.report.items, conv.job.len());
}

#[test]
fn pad_without_a_net_is_drawn_directly() {
    let yaml = r#"
pads:
  - at: [0, 0]
    shape: circle
    diameter: 1
  - at: [5, 0]
    shape: rect
    size: [1, 1]
    layer: both
"#;
    let conv = run(yaml, &Settings::default());
    assert_eq!(conv.report.merged_nets, 0);
    assert_eq!(count_on(&conv, CutLayer::TopCopper), 2);
    assert_eq!(count_on(&conv, CutLayer::BottomCopper), 1);
}

#[test]
fn degenerate_trace_is_skipped() {
    let yaml = r#"
traces:
  - net: A
    width: 0.3
    points: [[1, 1]]
  - net: A
    width: 0
    points: [[0, 0], [1, 0]]
"#;
    let conv = run(yaml, &Settings::default());
    assert_eq!(conv.report.skipped_elements, 2);
    assert!(conv.job.is_empty());
}

#[test]
fn via_puts_copper_on_both_sides_and_a_drill() {
    let yaml = r#"
vias:
  - at: [0, 0]
    diameter: 0.8
    drill: 0.4
    net: GND
"#;
    let conv = run(yaml, &Settings::default());
    assert_eq!(count_on(&conv, CutLayer::TopCopper), 1);
    assert_eq!(count_on(&conv, CutLayer::BottomCopper), 1);
    assert_eq!(count_on(&conv, CutLayer::Drill), 1);
}

#[test]
fn holes_and_cutouts_are_cut_paths() {
    let yaml = r#"
holes:
  - at: [0, 0]
    diameter: 3
  - at: [1, 1]
    diameter: -1
cutouts:
  - points: [[0, 0], [4, 0], [4, 4], [0, 4]]
"#;
    let conv = run(yaml, &Settings::default());
    assert_eq!(count_on(&conv, CutLayer::Drill), 1);
    assert_eq!(count_on(&conv, CutLayer::Cutout), 1);
    assert_eq!(conv.report.skipped_elements, 1);
}

#[test]
fn copper_fill_ring_is_produced_per_side() {
    let settings = Settings {
        copper_fill_margin: Some(0.5),
        ..Settings::default()
    };
    let conv = run(TWO_PADS, &settings);
    assert_eq!(conv.report.derived_layers, 1);
    assert_eq!(conv.report.derived_failures, 0);
    assert!(count_on(&conv, CutLayer::TopCopperFill) >= 1);
    assert_eq!(count_on(&conv, CutLayer::BottomCopperFill), 0);
}

#[test]
fn soldermask_cure_leaves_a_hole_per_opening() {
    let yaml = r#"
board:
  outline: [[0, 0], [20, 0], [20, 20], [0, 20]]
pads:
  - at: [10, 10]
    shape: rect
    size: [2, 2]
    net: A
    soldermask: { margin: 0 }
"#;
    let settings = Settings {
        soldermask_cure: true,
        ..Settings::default()
    };
    let conv = run(yaml, &settings);
    assert_eq!(count_on(&conv, CutLayer::TopSoldermask), 1);
    assert_eq!(conv.job.contours_on(CutLayer::TopSoldermaskCure).len(), 2);
    // no openings on the bottom: the whole board cures
    assert_eq!(conv.job.contours_on(CutLayer::BottomSoldermaskCure).len(), 1);
    assert_eq!(conv.report.derived_layers, 2);
}

#[test]
fn trace_clearance_band_only_when_margin_set() {
    let yaml = r#"
traces:
  - net: A
    width: 0.4
    points: [[0, 0], [5, 0]]
"#;
    let without = run(yaml, &Settings::default());
    assert_eq!(count_on(&without, CutLayer::TopTraceClearance), 0);

    let settings = Settings {
        trace_clearance_margin: Some(0.2),
        ..Settings::default()
    };
    let with = run(yaml, &settings);
    assert_eq!(count_on(&with, CutLayer::TopTraceClearance), 1);
    assert_eq!(count_on(&with, CutLayer::BottomTraceClearance), 0);
}

#[test]
fn job_survives_json() {
    let conv = run(TWO_PADS, &Settings::default());
    let json = conv.job.to_json().unwrap();
    let back = pcb2laser_export::LaserJob::from_json(&json).unwrap();
    assert_eq!(back.len(), conv.job.len());
}
