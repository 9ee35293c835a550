//! Overlap circles at trace endpoints.
//!
//! Flat trace caps that merely touch the next segment or a via leave the union with
//! zero-width contacts. A small disc at every centerline vertex makes the contact an overlap.

use pcb2laser_geometry::primitives::circle;
use pcb2laser_geometry::{Contour, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionSettings {
    /// Disc radius at trace vertices, as a multiple of half the trace width. `0` disables them.
    pub trace_scale: f64,
    /// Disc radius used instead when the vertex sits on a via of the same net.
    pub via_radius: f64,
}

impl Default for JunctionSettings {
    fn default() -> Self {
        Self {
            trace_scale: 1.1,
            via_radius: 0.3,
        }
    }
}

/// Via centre and radius, used to spot trace vertices that land on a via.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViaSite {
    pub center: Point,
    pub radius: f64,
}

/// Junction discs for one trace.
///
/// `vias` should only hold vias on the trace's own net.
#[must_use]
pub fn junction_circles(
    centerline: &[Point],
    width: f64,
    vias: &[ViaSite],
    settings: &JunctionSettings,
    tolerance: f64,
) -> Vec<Contour> {
    if settings.trace_scale <= 0.0 || width <= 0.0 {
        return Vec::new();
    }
    let half = width / 2.0;
    let mut out: Vec<Contour> = Vec::with_capacity(centerline.len());
    let mut last: Option<Point> = None;
    for &p in centerline {
        if last.is_some_and(|l| l.approx_eq(p, 1e-9)) {
            continue;
        }
        last = Some(p);
        let on_via = vias.iter().any(|v| v.center.distance(p) <= v.radius);
        let radius = if on_via {
            settings.via_radius
        } else {
            settings.trace_scale * half
        };
        if radius > 0.0 {
            out.push(circle(p, radius, tolerance));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_vertex_gets_a_disc() {
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)];
        let discs = junction_circles(&pts, 1.0, &[], &JunctionSettings::default(), 1e-4);
        assert_eq!(discs.len(), 3);
        let r = 0.55;
        assert_relative_eq!(discs[0].area(), std::f64::consts::PI * r * r, max_relative = 1e-3);
    }

    #[test]
    fn via_vertices_use_via_radius() {
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0)];
        let via = ViaSite {
            center: Point::new(5.0, 0.0),
            radius: 0.4,
        };
        let discs = junction_circles(&pts, 1.0, &[via], &JunctionSettings::default(), 1e-4);
        assert_relative_eq!(discs[1].area(), std::f64::consts::PI * 0.09, max_relative = 1e-3);
    }

    #[test]
    fn zero_scale_disables_discs() {
        let settings = JunctionSettings {
            trace_scale: 0.0,
            ..JunctionSettings::default()
        };
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0)];
        assert!(junction_circles(&pts, 1.0, &[], &settings, 1e-3).is_empty());
    }
}
