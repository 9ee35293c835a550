//! Layout to laser job.
//!
//! Elements are dispatched in a fixed order (outline, pads, vias, traces, holes, cutouts). Copper
//! with a net goes through the registry and is merged per net; copper without one is drawn
//! immediately. Derived layers run last, the soldermask cure after every opening is emitted.

use indexmap::IndexMap;
use pcb2laser_copper::{
    ClearanceRegistry, CopperLayer, DerivedOutcome, MergeStatus, NetId, NetMerger, NetRegistry,
    Synthesizer, ViaSite, junction_circles,
};
use pcb2laser_export::{CutLayer, CutPath, JobItem, LaserJob, emit_geometry, emit_shapes};
use pcb2laser_geometry::{Contour, Geometry, JoinStyle, Kernel, KernelError, Shape, trace_outline};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::elements::{cutout_contour, disc, pad_geometry};
use crate::model::{Layout, Pad};
use crate::settings::Settings;

/// Counts describing one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Items in the finished job.
    pub items: usize,
    /// Buckets whose union succeeded.
    pub merged_nets: usize,
    /// Buckets emitted unmerged after a union failure.
    pub merge_fallbacks: usize,
    pub skipped_elements: usize,
    pub derived_layers: usize,
    pub derived_failures: usize,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub job: LaserJob,
    pub report: ConversionReport,
}

#[must_use]
pub fn copper_layer(side: CopperLayer) -> CutLayer {
    match side {
        CopperLayer::Top => CutLayer::TopCopper,
        CopperLayer::Bottom => CutLayer::BottomCopper,
    }
}

fn fill_layer(side: CopperLayer) -> CutLayer {
    match side {
        CopperLayer::Top => CutLayer::TopCopperFill,
        CopperLayer::Bottom => CutLayer::BottomCopperFill,
    }
}

fn cut_fill_layer(side: CopperLayer) -> CutLayer {
    match side {
        CopperLayer::Top => CutLayer::TopCopperCutFill,
        CopperLayer::Bottom => CutLayer::BottomCopperCutFill,
    }
}

fn clearance_layer(side: CopperLayer) -> CutLayer {
    match side {
        CopperLayer::Top => CutLayer::TopTraceClearance,
        CopperLayer::Bottom => CutLayer::BottomTraceClearance,
    }
}

#[must_use]
pub fn soldermask_layer(side: CopperLayer) -> CutLayer {
    match side {
        CopperLayer::Top => CutLayer::TopSoldermask,
        CopperLayer::Bottom => CutLayer::BottomSoldermask,
    }
}

fn cure_layer(side: CopperLayer) -> CutLayer {
    match side {
        CopperLayer::Top => CutLayer::TopSoldermaskCure,
        CopperLayer::Bottom => CutLayer::BottomSoldermaskCure,
    }
}

/// Key for traces without a net in the clearance registry.
fn unnamed_net() -> NetId {
    NetId::new("")
}

struct Converter<'a> {
    layout: &'a Layout,
    settings: &'a Settings,
    kernel: &'a Kernel,
    job: LaserJob,
    registry: NetRegistry,
    clearance: ClearanceRegistry,
    vias_by_net: IndexMap<NetId, Vec<ViaSite>>,
    /// Final copper per side, merged islands plus copper without a net.
    copper: IndexMap<CopperLayer, Vec<Geometry>>,
    outline: Option<Contour>,
    report: ConversionReport,
}

/// Run the whole pipeline. Element and kernel problems degrade the output, never abort it.
pub fn convert(layout: &Layout, settings: &Settings, kernel: &Kernel) -> Conversion {
    let mut c = Converter {
        layout,
        settings,
        kernel,
        job: LaserJob::new(),
        registry: NetRegistry::new(),
        clearance: ClearanceRegistry::new(),
        vias_by_net: IndexMap::new(),
        copper: IndexMap::new(),
        outline: None,
        report: ConversionReport::default(),
    };
    for net in layout.all_nets() {
        c.registry.ensure_net(&net);
    }

    c.board_outline();
    c.pads();
    c.vias();
    c.traces();
    c.holes();
    c.cutouts();
    c.merge();
    c.derived();
    c.soldermask_cure();

    c.report.items = c.job.len();
    info!(
        items = c.report.items,
        merged = c.report.merged_nets,
        fallbacks = c.report.merge_fallbacks,
        skipped = c.report.skipped_elements,
        "conversion finished"
    );
    Conversion {
        job: c.job,
        report: c.report,
    }
}

impl Converter<'_> {
    fn tolerance(&self) -> f64 {
        self.settings.kernel.arc_tolerance
    }

    fn skip(&mut self, err: impl std::fmt::Display) {
        warn!(error = %err, "skipping element");
        self.report.skipped_elements += 1;
    }

    /// Register copper under its net, or draw it straight away when it has none.
    fn place_copper(&mut self, side: CopperLayer, net: Option<&NetId>, geometry: Geometry) {
        match net {
            Some(net) => self.registry.register(side, net, geometry),
            None => self.draw_copper(side, geometry),
        }
    }

    fn draw_copper(&mut self, side: CopperLayer, geometry: Geometry) {
        self.job.extend(emit_geometry(copper_layer(side), &geometry));
        self.copper.entry(side).or_default().push(geometry);
    }

    fn board_outline(&mut self) {
        let Some(board) = &self.layout.board else {
            debug!("layout has no board outline");
            return;
        };
        match board.contour() {
            Ok(outline) => {
                self.job.push(JobItem::Path(CutPath::from_contour(
                    CutLayer::BoardOutline,
                    &outline,
                )));
                self.outline = Some(outline);
            }
            Err(err) => warn!(error = %err, "ignoring board outline"),
        }
    }

    fn pads(&mut self) {
        let layout = self.layout;
        for (index, pad) in layout.pads.iter().enumerate() {
            let geometry = match pad_geometry(pad, index, self.tolerance()) {
                Ok(g) => g,
                Err(err) => {
                    self.skip(err);
                    continue;
                }
            };
            for &side in pad.layer.copper_layers() {
                self.place_copper(side, pad.net.as_ref(), geometry.clone());
            }
            self.soldermask_opening(pad, index, &geometry);
        }
    }

    fn soldermask_opening(&mut self, pad: &Pad, index: usize, geometry: &Geometry) {
        let Some(opening) = pad.soldermask else {
            return;
        };
        let shapes: Result<Vec<Shape>, KernelError> = if opening.margin == 0.0 {
            Ok(vec![geometry.clone().into_shape()])
        } else {
            self.kernel
                .union_geometries(std::slice::from_ref(geometry))
                .and_then(|base| base.offset(opening.margin, JoinStyle::Round))
                .map(|grown| grown.to_shapes())
        };
        match shapes {
            Ok(shapes) => {
                for &side in pad.layer.copper_layers() {
                    self.job.extend(emit_shapes(soldermask_layer(side), &shapes));
                }
            }
            Err(err) => warn!(pad = index, error = %err, "soldermask opening dropped"),
        }
    }

    fn vias(&mut self) {
        let layout = self.layout;
        for (index, via) in layout.vias.iter().enumerate() {
            let copper = match disc("via", index, via.at, via.diameter, self.tolerance()) {
                Ok(c) => c,
                Err(err) => {
                    self.skip(err);
                    continue;
                }
            };
            for side in CopperLayer::ALL {
                self.place_copper(side, via.net.as_ref(), copper.clone().into());
            }
            if let Some(net) = &via.net {
                self.vias_by_net.entry(net.clone()).or_default().push(ViaSite {
                    center: via.at,
                    radius: via.diameter / 2.0,
                });
            }
            match disc("via drill", index, via.at, via.drill, self.tolerance()) {
                Ok(drill) => self
                    .job
                    .push(JobItem::Path(CutPath::from_contour(CutLayer::Drill, &drill))),
                Err(err) => warn!(error = %err, "via drill dropped"),
            }
        }
    }

    fn traces(&mut self) {
        let layout = self.layout;
        let margin = self.settings.clearance_margin();
        for (index, trace) in layout.traces.iter().enumerate() {
            let outline = match trace_outline(&trace.points, trace.width) {
                Ok(c) => c,
                Err(err) => {
                    self.skip(format!("trace {index}: {err}"));
                    continue;
                }
            };
            let side = trace.layer;
            match &trace.net {
                Some(net) => {
                    let vias = self.vias_by_net.get(net).map(Vec::as_slice).unwrap_or(&[]);
                    let discs = junction_circles(
                        &trace.points,
                        trace.width,
                        vias,
                        &self.settings.junctions,
                        self.tolerance(),
                    );
                    self.registry.register(side, net, outline.into());
                    for d in discs {
                        self.registry.register(side, net, d.into());
                    }
                }
                None => self.draw_copper(side, outline.into()),
            }
            if let Some(margin) = margin {
                let net = trace.net.clone().unwrap_or_else(unnamed_net);
                if let Err(err) =
                    self.clearance
                        .add_trace(side, &net, &trace.points, trace.width, margin)
                {
                    warn!(trace = index, error = %err, "trace clearance outline dropped");
                }
            }
        }
    }

    fn holes(&mut self) {
        let layout = self.layout;
        for (index, hole) in layout.holes.iter().enumerate() {
            match disc("hole", index, hole.at, hole.diameter, self.tolerance()) {
                Ok(c) => self
                    .job
                    .push(JobItem::Path(CutPath::from_contour(CutLayer::Drill, &c))),
                Err(err) => self.skip(err),
            }
        }
    }

    fn cutouts(&mut self) {
        let layout = self.layout;
        for (index, cutout) in layout.cutouts.iter().enumerate() {
            match cutout_contour(&cutout.points, index) {
                Ok(c) => self
                    .job
                    .push(JobItem::Path(CutPath::from_contour(CutLayer::Cutout, &c))),
                Err(err) => self.skip(err),
            }
        }
    }

    /// Merge every net and emit the islands.
    fn merge(&mut self) {
        let merger = NetMerger::new(self.kernel);
        for merged in merger.merge_all(&self.registry) {
            match merged.island.status {
                MergeStatus::Merged => self.report.merged_nets += 1,
                MergeStatus::Unmerged => self.report.merge_fallbacks += 1,
                MergeStatus::Single | MergeStatus::Empty => {}
            }
            let layer = copper_layer(merged.layer);
            for part in &merged.island.parts {
                self.job.extend(emit_geometry(layer, part));
            }
            self.copper
                .entry(merged.layer)
                .or_default()
                .extend(merged.island.parts);
        }
    }

    fn record(&mut self, layer: CutLayer, outcome: DerivedOutcome) {
        match outcome {
            DerivedOutcome::Produced(shapes) => {
                self.report.derived_layers += 1;
                self.job.extend(emit_shapes(layer, &shapes));
            }
            DerivedOutcome::Failed => self.report.derived_failures += 1,
            DerivedOutcome::Skipped => {}
        }
    }

    fn derived(&mut self) {
        let syn = Synthesizer::new(self.kernel, self.settings.simplify_tolerance);
        for side in CopperLayer::ALL {
            let geoms = self.copper.get(&side).map(Vec::as_slice).unwrap_or(&[]);
            let fill = syn.copper_fill(side, geoms, self.settings.copper_fill_margin);
            let cut_fill = syn.copper_cut_fill(side, geoms, self.settings.copper_cut_fill_margin);
            self.record(fill_layer(side), fill);
            self.record(cut_fill_layer(side), cut_fill);
            if self.settings.clearance_margin().is_some() {
                let clearance = syn.trace_clearance(side, &self.clearance);
                self.record(clearance_layer(side), clearance);
            }
        }
        if self.settings.oxidation_cleaning {
            let fill = syn.oxidation_cleaning(self.outline.as_ref());
            self.record(CutLayer::OxidationCleaning, fill);
        }
    }

    fn soldermask_cure(&mut self) {
        if !self.settings.soldermask_cure {
            return;
        }
        let syn = Synthesizer::new(self.kernel, self.settings.simplify_tolerance);
        for side in CopperLayer::ALL {
            let openings = self.job.contours_on(soldermask_layer(side));
            let cure = syn.soldermask_cure(self.outline.as_ref(), &openings);
            self.record(cure_layer(side), cure);
        }
    }
}
