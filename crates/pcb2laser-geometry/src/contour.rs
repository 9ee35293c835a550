use serde::{Deserialize, Serialize};

use crate::point::{Point, segments_cross};

/// Consecutive points closer than this are treated as duplicates.
pub const DEDUP_EPS: f64 = 1e-9;

/// Orientation of a closed contour, derived from its signed area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Counter-clockwise; an outer boundary.
    Positive,
    /// Clockwise; a hole.
    Negative,
    /// Zero area.
    Degenerate,
}

/// Why a contour cannot be fed to the boolean kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContourProblem {
    #[error("fewer than 3 distinct points")]
    TooFewPoints,
    #[error("non-finite coordinate")]
    NonFinite,
    #[error("zero enclosed area")]
    ZeroArea,
    #[error("boundary intersects itself")]
    SelfIntersecting,
}

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    #[must_use]
    pub fn of(points: &[Point]) -> Option<Bounds> {
        let first = *points.first()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        Some(b)
    }

    #[must_use]
    pub fn overlaps(self, other: Bounds, eps: f64) -> bool {
        self.min.x <= other.max.x + eps
            && other.min.x <= self.max.x + eps
            && self.min.y <= other.max.y + eps
            && other.min.y <= self.max.y + eps
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.max.y - self.min.y
    }
}

/// A closed, simple polygon boundary.
///
/// The closing edge from the last point back to the first is implicit. Orientation is part of the
/// value: a positive signed area marks an outer boundary, a negative one a hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace signed area.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.edges().map(|(a, b)| a.cross(b)).sum::<f64>() / 2.0
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(a, b)| a.distance(b)).sum()
    }

    #[must_use]
    pub fn winding(&self) -> Winding {
        let a = self.signed_area();
        if a > 0.0 {
            Winding::Positive
        } else if a < 0.0 {
            Winding::Negative
        } else {
            Winding::Degenerate
        }
    }

    #[must_use]
    pub fn is_outer(&self) -> bool {
        self.winding() == Winding::Positive
    }

    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.points.reverse();
        self
    }

    /// Reverse if needed so the contour has the requested orientation.
    ///
    /// Degenerate contours are returned unchanged.
    #[must_use]
    pub fn with_winding(self, desired: Winding) -> Self {
        match (self.winding(), desired) {
            (Winding::Positive, Winding::Negative) | (Winding::Negative, Winding::Positive) => {
                self.reversed()
            }
            _ => self,
        }
    }

    /// Drop consecutive points within `eps` of each other, including a closing point that repeats
    /// the first one.
    #[must_use]
    pub fn dedup(self, eps: f64) -> Self {
        Self::new(dedup_points(self.points, eps))
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(&self.points)
    }

    /// Winding number of `p` with respect to this contour. Non-zero means inside.
    #[must_use]
    pub fn winding_number(&self, p: Point) -> i32 {
        winding_number(p, &self.points)
    }

    /// Inside-or-on test using the non-zero rule.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.winding_number(p) != 0
    }

    /// Shortest distance from `p` to any edge of the contour.
    #[must_use]
    pub fn distance_to_boundary(&self, p: Point) -> f64 {
        self.edges()
            .map(|(a, b)| distance_to_segment(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// True when two non-adjacent edges cross.
    #[must_use]
    pub fn is_self_intersecting(&self) -> bool {
        let n = self.points.len();
        if n < 4 {
            return false;
        }
        let edges: Vec<(Point, Point)> = self.edges().collect();
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (a0, a1) = edges[i];
                let (b0, b1) = edges[j];
                if segments_cross(a0, a1, b0, b1) {
                    return true;
                }
            }
        }
        false
    }

    /// Check the contour is usable as boolean-kernel input.
    pub fn validate(&self) -> Result<(), ContourProblem> {
        if self.points.iter().any(|p| !p.is_finite()) {
            return Err(ContourProblem::NonFinite);
        }
        let distinct = dedup_points(self.points.clone(), DEDUP_EPS);
        if distinct.len() < 3 {
            return Err(ContourProblem::TooFewPoints);
        }
        if self.signed_area().abs() <= DEDUP_EPS {
            return Err(ContourProblem::ZeroArea);
        }
        if self.is_self_intersecting() {
            return Err(ContourProblem::SelfIntersecting);
        }
        Ok(())
    }

    /// A point strictly inside the contour.
    ///
    /// Probes just inside the midpoint of each edge; falls back to the vertex average.
    #[must_use]
    pub fn interior_point(&self) -> Point {
        let n = self.points.len();
        if n == 0 {
            return Point::default();
        }
        let scale = self
            .bounds()
            .map(|b| b.width().max(b.height()))
            .unwrap_or(1.0);
        let step = (scale * 1e-4).max(1e-7);
        let inward_left = self.signed_area() >= 0.0;
        for (a, b) in self.edges() {
            let Some(dir) = (b - a).normalized() else {
                continue;
            };
            let normal = if inward_left { dir.perp() } else { -dir.perp() };
            let sample = a.midpoint(b) + normal * step;
            if self.contains(sample) {
                return sample;
            }
        }
        let sum = self
            .points
            .iter()
            .fold(Point::default(), |acc, p| acc + *p);
        sum * (1.0 / n as f64)
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Contour::new(points)
    }
}

pub(crate) fn dedup_points(points: Vec<Point>, eps: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| last.approx_eq(p, eps)) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 && out[0].approx_eq(out[out.len() - 1], eps) {
        out.pop();
    }
    out
}

/// Winding number of `p` with respect to the closed polygon `verts`.
///
/// Non-zero => inside, zero => outside.
#[must_use]
pub fn winding_number(p: Point, verts: &[Point]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let side = (b - a).cross(p - a);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
