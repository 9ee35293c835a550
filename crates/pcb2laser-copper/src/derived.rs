//! Secondary layers computed from merged copper and the board outline.
//!
//! Every derived layer is optional. Missing inputs skip the layer quietly; a kernel failure drops
//! only the layer being computed.

use std::fmt;

use pcb2laser_geometry::{Contour, FillRule, Geometry, JoinStyle, Kernel, KernelError, Shape};
use tracing::{debug, warn};

use crate::clearance::ClearanceRegistry;
use crate::registry::CopperLayer;

/// Default distance tolerance for the post-boolean cleanup.
pub const SIMPLIFY_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedLayer {
    CopperFill,
    CopperCutFill,
    TraceClearance,
    OxidationCleaning,
    SoldermaskCure,
}

impl fmt::Display for DerivedLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DerivedLayer::CopperFill => "copper fill",
            DerivedLayer::CopperCutFill => "copper cut-fill",
            DerivedLayer::TraceClearance => "trace clearance",
            DerivedLayer::OxidationCleaning => "oxidation cleaning",
            DerivedLayer::SoldermaskCure => "soldermask cure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DerivedOutcome {
    /// Inputs or settings absent; nothing was computed.
    Skipped,
    Produced(Vec<Shape>),
    /// The kernel failed; the warning has already been logged.
    Failed,
}

impl DerivedOutcome {
    /// Produced shapes, empty for the other outcomes.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        match self {
            DerivedOutcome::Produced(shapes) => shapes,
            _ => &[],
        }
    }
}

pub struct Synthesizer<'k> {
    kernel: &'k Kernel,
    tolerance: f64,
}

impl<'k> Synthesizer<'k> {
    #[must_use]
    pub fn new(kernel: &'k Kernel, tolerance: f64) -> Self {
        Self { kernel, tolerance }
    }

    /// `offset(union(copper), +margin, round) − union(copper)`.
    pub fn copper_fill(&self, layer: CopperLayer, copper: &[Geometry], margin: Option<f64>) -> DerivedOutcome {
        self.fill_ring(DerivedLayer::CopperFill, layer, copper, margin)
    }

    /// Same ring as [`Synthesizer::copper_fill`], at the cut-fill margin.
    pub fn copper_cut_fill(
        &self,
        layer: CopperLayer,
        copper: &[Geometry],
        margin: Option<f64>,
    ) -> DerivedOutcome {
        self.fill_ring(DerivedLayer::CopperCutFill, layer, copper, margin)
    }

    fn fill_ring(
        &self,
        kind: DerivedLayer,
        layer: CopperLayer,
        copper: &[Geometry],
        margin: Option<f64>,
    ) -> DerivedOutcome {
        let Some(margin) = margin.filter(|m| *m > 0.0) else {
            debug!(derived = %kind, %layer, "no positive margin, skipping");
            return DerivedOutcome::Skipped;
        };
        if copper.is_empty() {
            debug!(derived = %kind, %layer, "no copper, skipping");
            return DerivedOutcome::Skipped;
        }
        let result = (|| -> Result<Vec<Shape>, KernelError> {
            let base = self.kernel.union_geometries(copper)?;
            let ring = base
                .offset(margin, JoinStyle::Round)?
                .difference(&base)?
                .simplify(self.tolerance);
            Ok(ring.to_shapes())
        })();
        self.finish(kind, Some(layer), result)
    }

    /// `union(outer) − union(inner)` per net, concatenated in registration order.
    pub fn trace_clearance(&self, layer: CopperLayer, traces: &ClearanceRegistry) -> DerivedOutcome {
        let kind = DerivedLayer::TraceClearance;
        let mut shapes: Vec<Shape> = Vec::new();
        let mut any = false;
        for (net, band) in traces.on_layer(layer) {
            any = true;
            let result = (|| -> Result<Vec<Shape>, KernelError> {
                let outer = self.kernel.union(&band.outer, FillRule::NonZero)?;
                let inner = self.kernel.union(&band.inner, FillRule::NonZero)?;
                Ok(outer.difference(&inner)?.simplify(self.tolerance).to_shapes())
            })();
            match result {
                Ok(s) => shapes.extend(s),
                Err(err) => {
                    warn!(derived = %kind, %layer, %net, error = %err, "derived layer dropped");
                    return DerivedOutcome::Failed;
                }
            }
        }
        if !any {
            debug!(derived = %kind, %layer, "no traces, skipping");
            return DerivedOutcome::Skipped;
        }
        produced(shapes)
    }

    /// The board outline routed once through the kernel.
    pub fn oxidation_cleaning(&self, outline: Option<&Contour>) -> DerivedOutcome {
        let kind = DerivedLayer::OxidationCleaning;
        let Some(outline) = outline else {
            debug!(derived = %kind, "no board outline, skipping");
            return DerivedOutcome::Skipped;
        };
        let result = self
            .kernel
            .union(std::slice::from_ref(outline), FillRule::NonZero)
            .map(|s| s.simplify(self.tolerance).to_shapes());
        self.finish(kind, None, result)
    }

    /// `outline − union(openings)`; `openings` are read back from the emitted job.
    pub fn soldermask_cure(&self, outline: Option<&Contour>, openings: &[Contour]) -> DerivedOutcome {
        let kind = DerivedLayer::SoldermaskCure;
        let Some(outline) = outline else {
            debug!(derived = %kind, "no board outline, skipping");
            return DerivedOutcome::Skipped;
        };
        let result = (|| -> Result<Vec<Shape>, KernelError> {
            let board = self
                .kernel
                .union(std::slice::from_ref(outline), FillRule::NonZero)?;
            if openings.is_empty() {
                return Ok(board.simplify(self.tolerance).to_shapes());
            }
            let cut = self.kernel.union(openings, FillRule::Positive)?;
            Ok(board.difference(&cut)?.simplify(self.tolerance).to_shapes())
        })();
        self.finish(kind, None, result)
    }

    fn finish(
        &self,
        kind: DerivedLayer,
        layer: Option<CopperLayer>,
        result: Result<Vec<Shape>, KernelError>,
    ) -> DerivedOutcome {
        match result {
            Ok(shapes) => produced(shapes),
            Err(err) => {
                match layer {
                    Some(layer) => warn!(derived = %kind, %layer, error = %err, "derived layer dropped"),
                    None => warn!(derived = %kind, error = %err, "derived layer dropped"),
                }
                DerivedOutcome::Failed
            }
        }
    }
}

fn produced(shapes: Vec<Shape>) -> DerivedOutcome {
    if shapes.is_empty() {
        DerivedOutcome::Skipped
    } else {
        DerivedOutcome::Produced(shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NetId;
    use approx::assert_relative_eq;
    use pcb2laser_geometry::{KernelOptions, Point, Rect, trace_outline};

    fn kernel() -> Kernel {
        Kernel::new(KernelOptions::default())
    }

    fn board() -> Contour {
        Rect::new(Point::new(0.0, 0.0), Point::new(20.0, 10.0)).to_contour()
    }

    #[test]
    fn fill_ring_around_straight_trace() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let trace = trace_outline(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], 0.5).unwrap();
        let out = syn.copper_fill(CopperLayer::Top, &[trace.into()], Some(0.5));
        let shapes = out.shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);

        let d = 0.5;
        let expected = 21.0 * d + std::f64::consts::PI * d * d;
        let area: f64 = shapes.iter().map(Shape::area).sum();
        assert_relative_eq!(area, expected, max_relative = 0.02);
        for x in [0.0, 2.5, 5.0, 7.5, 10.0] {
            assert!(!shapes[0].contains(Point::new(x, 0.0)));
        }
        assert_eq!(k.live_shapes(), 0);
    }

    #[test]
    fn missing_margin_or_copper_is_skipped() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let pad: Geometry = Rect::centered(Point::default(), 1.0, 1.0).into();
        assert_eq!(syn.copper_fill(CopperLayer::Top, &[pad.clone()], None), DerivedOutcome::Skipped);
        assert_eq!(
            syn.copper_cut_fill(CopperLayer::Top, &[pad], Some(0.0)),
            DerivedOutcome::Skipped
        );
        assert_eq!(syn.copper_fill(CopperLayer::Top, &[], Some(1.0)), DerivedOutcome::Skipped);
        assert_eq!(syn.oxidation_cleaning(None), DerivedOutcome::Skipped);
        assert_eq!(syn.soldermask_cure(None, &[]), DerivedOutcome::Skipped);
    }

    #[test]
    fn trace_clearance_is_outer_minus_inner() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let mut traces = ClearanceRegistry::new();
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        traces
            .add_trace(CopperLayer::Bottom, &NetId::from("A"), &pts, 0.5, 0.25)
            .unwrap();
        let out = syn.trace_clearance(CopperLayer::Bottom, &traces);
        let area: f64 = out.shapes().iter().map(Shape::area).sum();
        assert_relative_eq!(area, 10.0 - 5.0, max_relative = 1e-6);
        assert_eq!(syn.trace_clearance(CopperLayer::Top, &traces), DerivedOutcome::Skipped);
    }

    #[test]
    fn oxidation_cleaning_is_the_outline() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let out = syn.oxidation_cleaning(Some(&board()));
        assert_relative_eq!(out.shapes()[0].area(), 200.0, max_relative = 1e-9);
    }

    #[test]
    fn cure_area_has_one_hole_per_opening() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let opening = Rect::centered(Point::new(5.0, 5.0), 2.0, 2.0).to_contour();
        let out = syn.soldermask_cure(Some(&board()), &[opening]);
        let shapes = out.shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!(shapes[0].outer.is_outer());
        assert!(!shapes[0].holes[0].is_outer());
        assert_relative_eq!(shapes[0].area(), 196.0, max_relative = 1e-9);
    }

    #[test]
    fn overlapping_openings_are_cut_once() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let openings = [
            Rect::centered(Point::new(5.0, 5.0), 4.0, 4.0).to_contour(),
            Rect::centered(Point::new(6.5, 5.0), 2.0, 2.0).to_contour(),
        ];
        let out = syn.soldermask_cure(Some(&board()), &openings);
        let shapes = out.shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
        assert_relative_eq!(shapes[0].area(), 200.0 - 17.0, max_relative = 1e-9);
        assert!(!shapes[0].contains(Point::new(7.25, 5.0)));
    }

    #[test]
    fn clearance_of_overlapping_traces_on_one_net() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let net = NetId::from("A");
        let mut traces = ClearanceRegistry::new();
        traces
            .add_trace(CopperLayer::Top, &net, &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], 2.0, 0.5)
            .unwrap();
        traces
            .add_trace(CopperLayer::Top, &net, &[Point::new(2.0, 0.6), Point::new(14.0, 0.6)], 1.0, 0.5)
            .unwrap();
        let out = syn.trace_clearance(CopperLayer::Top, &traces);
        let area: f64 = out.shapes().iter().map(Shape::area).sum();
        // outer 30 + 24 - 15.2, inner 20 + 12 - 7.2
        assert_relative_eq!(area, 38.8 - 24.8, max_relative = 1e-6);
        for p in [Point::new(5.0, 0.0), Point::new(12.0, 0.6)] {
            assert!(out.shapes().iter().all(|s| !s.contains(p)));
        }
        assert!(out.shapes().iter().any(|s| s.contains(Point::new(12.0, 1.4))));
    }

    #[test]
    fn bad_outline_drops_only_that_layer() {
        let k = kernel();
        let syn = Synthesizer::new(&k, SIMPLIFY_TOLERANCE);
        let bow = Contour::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
        ]);
        assert_eq!(syn.oxidation_cleaning(Some(&bow)), DerivedOutcome::Failed);
        assert_eq!(k.live_shapes(), 0);
    }
}
