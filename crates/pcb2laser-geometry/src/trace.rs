//! Stroked trace outlines built by direct perpendicular offsetting.
//!
//! No boolean operation is involved: each side of the centerline is offset by half the width,
//! interior joints are mitered by intersecting the adjacent offset lines, and both ends get a flat
//! cap. The result is normalized to positive orientation like every other outer contour.

use crate::contour::{Contour, DEDUP_EPS, Winding, dedup_points};
use crate::point::{Point, line_intersection};

/// Below this `|d_prev × d_next|` two segment directions are treated as parallel.
pub const PARALLEL_EPS: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraceError {
    #[error("degenerate trace input: {reason}")]
    DegenerateInput { reason: &'static str },
}

impl TraceError {
    fn degenerate(reason: &'static str) -> Self {
        TraceError::DegenerateInput { reason }
    }
}

/// Offset endpoints of one centerline segment.
#[derive(Debug, Clone, Copy)]
struct OffsetSegment {
    start: Point,
    end: Point,
    dir: Point,
}

/// Build the closed outline of a polyline stroked with `width`.
///
/// Consecutive duplicate points (within 1e-9) are removed first; fewer than two remaining points
/// or a non-positive width is [`TraceError::DegenerateInput`].
pub fn trace_outline(centerline: &[Point], width: f64) -> Result<Contour, TraceError> {
    if !width.is_finite() || width <= 0.0 {
        return Err(TraceError::degenerate("width must be positive"));
    }
    if centerline.iter().any(|p| !p.is_finite()) {
        return Err(TraceError::degenerate("non-finite centerline point"));
    }

    let mut pts: Vec<Point> = Vec::with_capacity(centerline.len());
    for &p in centerline {
        if pts.last().is_some_and(|last: &Point| last.approx_eq(p, DEDUP_EPS)) {
            continue;
        }
        pts.push(p);
    }
    if pts.len() < 2 {
        return Err(TraceError::degenerate("fewer than 2 distinct points"));
    }

    let half = width / 2.0;
    let mut left: Vec<OffsetSegment> = Vec::with_capacity(pts.len() - 1);
    let mut right: Vec<OffsetSegment> = Vec::with_capacity(pts.len() - 1);
    for w in pts.windows(2) {
        let dir = (w[1] - w[0])
            .normalized()
            .ok_or_else(|| TraceError::degenerate("zero-length segment"))?;
        let n = dir.perp() * half;
        left.push(OffsetSegment {
            start: w[0] + n,
            end: w[1] + n,
            dir,
        });
        right.push(OffsetSegment {
            start: w[0] - n,
            end: w[1] - n,
            dir,
        });
    }

    let mut outline: Vec<Point> = Vec::with_capacity(pts.len() * 2 + 4);

    // Left side, forward.
    outline.push(left[0].start);
    for j in 1..left.len() {
        push_joint(&mut outline, left[j - 1], left[j]);
    }
    outline.push(left[left.len() - 1].end);

    // End cap is the straight edge from the last left point to the last right point.
    outline.push(right[right.len() - 1].end);
    for j in (1..right.len()).rev() {
        push_joint_reversed(&mut outline, right[j - 1], right[j]);
    }
    outline.push(right[0].start);
    // Start cap closes back to left[0].start implicitly.

    let contour = Contour::new(dedup_points(outline, DEDUP_EPS));
    if contour.len() < 3 {
        return Err(TraceError::degenerate("outline collapsed"));
    }
    Ok(contour.with_winding(Winding::Positive))
}

/// Mitered joint between `prev` and `next` while walking forward.
fn push_joint(out: &mut Vec<Point>, prev: OffsetSegment, next: OffsetSegment) {
    match line_intersection(prev.start, prev.dir, next.start, next.dir, PARALLEL_EPS) {
        Some(p) => out.push(p),
        None => {
            out.push(prev.end);
            out.push(next.start);
        }
    }
}

/// Same joint rule while walking the opposite side backward.
fn push_joint_reversed(out: &mut Vec<Point>, prev: OffsetSegment, next: OffsetSegment) {
    match line_intersection(prev.start, prev.dir, next.start, next.dir, PARALLEL_EPS) {
        Some(p) => out.push(p),
        None => {
            out.push(next.start);
            out.push(prev.end);
        }
    }
}
