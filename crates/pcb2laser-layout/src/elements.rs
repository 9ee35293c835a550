//! Per-element outline construction.

use pcb2laser_geometry::primitives::{circle, oval, pill, polygon, rectangle, rounded_rectangle};
use pcb2laser_geometry::{Contour, Geometry, Point};

use crate::error::ElementError;
use crate::model::{Pad, PadShape};

fn positive(what: &'static str, index: usize, name: &str, v: f64) -> Result<f64, ElementError> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ElementError::invalid(what, index, format!("{name} must be positive, got {v}")))
    }
}

fn size2(index: usize, size: [f64; 2]) -> Result<(f64, f64), ElementError> {
    Ok((
        positive("pad", index, "width", size[0])?,
        positive("pad", index, "height", size[1])?,
    ))
}

/// Copper outline of `pad`, validated for the boolean kernel.
pub fn pad_geometry(pad: &Pad, index: usize, tolerance: f64) -> Result<Geometry, ElementError> {
    let geometry: Geometry = match &pad.shape {
        PadShape::Rect { size } => rectangle(pad.at, size2(index, *size)?, pad.rotation),
        PadShape::Circle { diameter } => {
            let d = positive("pad", index, "diameter", *diameter)?;
            circle(pad.at, d / 2.0, tolerance).into()
        }
        PadShape::RoundedRect { size, radius } => {
            rounded_rectangle(pad.at, size2(index, *size)?, *radius, pad.rotation, tolerance).into()
        }
        PadShape::Pill { size } => pill(pad.at, size2(index, *size)?, pad.rotation, tolerance).into(),
        PadShape::Oval { size } => oval(pad.at, size2(index, *size)?, pad.rotation, tolerance).into(),
        PadShape::Polygon { points } => polygon(pad.at, points, pad.rotation).into(),
    };
    check(geometry, "pad", index)
}

/// Copper disc or drill circle.
pub fn disc(what: &'static str, index: usize, at: Point, diameter: f64, tolerance: f64) -> Result<Contour, ElementError> {
    let d = positive(what, index, "diameter", diameter)?;
    Ok(circle(at, d / 2.0, tolerance))
}

/// Closed cutout outline.
pub fn cutout_contour(points: &[Point], index: usize) -> Result<Contour, ElementError> {
    let c = Contour::new(points.to_vec()).dedup(pcb2laser_geometry::contour::DEDUP_EPS);
    c.validate()
        .map_err(|problem| ElementError::invalid("cutout", index, problem.to_string()))?;
    Ok(c)
}

fn check(geometry: Geometry, what: &'static str, index: usize) -> Result<Geometry, ElementError> {
    for c in geometry.to_contours() {
        c.validate()
            .map_err(|problem| ElementError::invalid(what, index, problem.to_string()))?;
    }
    Ok(geometry)
}
