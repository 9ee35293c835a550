//! Parametric outline builders for pad and hole shapes.
//!
//! Curves are tessellated into straight segments here; nothing downstream synthesizes arcs.

use std::f64::consts::{PI, TAU};

use crate::contour::Contour;
use crate::geometry::{Geometry, Rect, Shape};
use crate::point::Point;

/// Number of chords needed so a sweep of `sweep` radians on radius `radius` stays within
/// `tolerance` of the true arc.
#[must_use]
pub fn arc_segments(radius: f64, sweep: f64, tolerance: f64) -> usize {
    let sweep = sweep.abs();
    if radius <= tolerance || tolerance <= 0.0 {
        return ((sweep / (PI / 4.0)).ceil() as usize).max(1);
    }
    let max_step = 2.0 * (1.0 - tolerance / radius).acos();
    ((sweep / max_step).ceil() as usize).max(1)
}

fn arc_points(center: Point, radius: f64, start: f64, sweep: f64, tolerance: f64) -> Vec<Point> {
    let n = arc_segments(radius, sweep, tolerance);
    (0..=n)
        .map(|i| {
            let a = start + sweep * (i as f64) / (n as f64);
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

#[must_use]
pub fn circle(center: Point, radius: f64, tolerance: f64) -> Contour {
    let n = arc_segments(radius, TAU, tolerance).max(8);
    let pts = (0..n)
        .map(|i| {
            let a = TAU * (i as f64) / (n as f64);
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect();
    Contour::new(pts)
}

/// Rectangle pad. Unrotated rectangles stay in the lightweight [`Rect`] form.
#[must_use]
pub fn rectangle(center: Point, size: (f64, f64), rotation_deg: f64) -> Geometry {
    let rect = Rect::centered(center, size.0, size.1);
    if rotation_deg.rem_euclid(360.0) == 0.0 {
        return Geometry::Rect(rect);
    }
    let pts = rect
        .to_contour()
        .into_points()
        .into_iter()
        .map(|p| p.rotated_about(center, rotation_deg))
        .collect();
    Geometry::Shape(Shape::solid(Contour::new(pts)))
}

#[must_use]
pub fn rounded_rectangle(
    center: Point,
    size: (f64, f64),
    corner_radius: f64,
    rotation_deg: f64,
    tolerance: f64,
) -> Contour {
    let (w, h) = size;
    let hw = w / 2.0;
    let hh = h / 2.0;
    let r = corner_radius.min(hw).min(hh).max(0.0);

    let mut pts: Vec<Point> = Vec::new();
    if r == 0.0 {
        pts.extend(Rect::centered(center, w, h).to_contour().into_points());
    } else {
        // Corner arc centers, counter-clockwise starting bottom-right.
        let corners = [
            (Point::new(center.x + hw - r, center.y - hh + r), -PI / 2.0),
            (Point::new(center.x + hw - r, center.y + hh - r), 0.0),
            (Point::new(center.x - hw + r, center.y + hh - r), PI / 2.0),
            (Point::new(center.x - hw + r, center.y - hh + r), PI),
        ];
        for (c, start) in corners {
            pts.extend(arc_points(c, r, start, PI / 2.0, tolerance));
        }
    }

    let pts = pts
        .into_iter()
        .map(|p| p.rotated_about(center, rotation_deg))
        .collect();
    Contour::new(pts).dedup(crate::contour::DEDUP_EPS)
}

/// Stadium (obround) shape: a rectangle with fully rounded short ends.
#[must_use]
pub fn pill(center: Point, size: (f64, f64), rotation_deg: f64, tolerance: f64) -> Contour {
    let r = size.0.min(size.1) / 2.0;
    rounded_rectangle(center, size, r, rotation_deg, tolerance)
}

#[must_use]
pub fn oval(center: Point, size: (f64, f64), rotation_deg: f64, tolerance: f64) -> Contour {
    let rx = size.0 / 2.0;
    let ry = size.1 / 2.0;
    let n = arc_segments(rx.max(ry), TAU, tolerance).max(8);
    let pts = (0..n)
        .map(|i| {
            let a = TAU * (i as f64) / (n as f64);
            Point::new(center.x + rx * a.cos(), center.y + ry * a.sin())
                .rotated_about(center, rotation_deg)
        })
        .collect();
    Contour::new(pts)
}

/// Polygon from explicit vertices, offset to `center` and rotated about it.
#[must_use]
pub fn polygon(center: Point, vertices: &[Point], rotation_deg: f64) -> Contour {
    let pts = vertices
        .iter()
        .map(|&v| (center + v).rotated_about(center, rotation_deg))
        .collect();
    Contour::new(pts)
}
