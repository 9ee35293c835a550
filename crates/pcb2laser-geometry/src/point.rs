use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A position in the shared board unit.
///
/// Serialized as a `[x, y]` pair so layout files can write points inline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    #[must_use]
    pub fn normalized(self) -> Option<Point> {
        let len = self.length();
        if len <= f64::EPSILON {
            return None;
        }
        Some(Point::new(self.x / len, self.y / len))
    }

    /// Left-hand perpendicular (rotated +90°).
    #[must_use]
    pub fn perp(self) -> Point {
        Point::new(-self.y, self.x)
    }

    #[must_use]
    pub fn approx_eq(self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rotate about `origin` by `angle_deg` (counter-clockwise).
    #[must_use]
    pub fn rotated_about(self, origin: Point, angle_deg: f64) -> Point {
        if angle_deg == 0.0 {
            return self;
        }
        let (s, c) = angle_deg.to_radians().sin_cos();
        let d = self - origin;
        Point::new(origin.x + d.x * c - d.y * s, origin.y + d.x * s + d.y * c)
    }
}

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Point::new(v[0], v[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point::new(v.0, v.1)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Intersection of the infinite lines `p1 + t·d1` and `p2 + u·d2`.
///
/// Returns `None` when `|d1 × d2| < parallel_eps`.
#[must_use]
pub fn line_intersection(p1: Point, d1: Point, p2: Point, d2: Point, parallel_eps: f64) -> Option<Point> {
    let cross = d1.cross(d2);
    if cross.abs() < parallel_eps {
        return None;
    }
    let t = (p2 - p1).cross(d2) / cross;
    Some(p1 + d1 * t)
}

/// True when segments `a0-a1` and `b0-b1` cross at a point interior to both.
///
/// Shared endpoints and collinear overlaps are not reported.
#[must_use]
pub fn segments_cross(a0: Point, a1: Point, b0: Point, b1: Point) -> bool {
    let da = a1 - a0;
    let db = b1 - b0;
    let cross = da.cross(db);
    if cross.abs() < 1e-12 {
        return false;
    }
    let d = b0 - a0;
    let t = d.cross(db) / cross;
    let u = d.cross(da) / cross;
    let eps = 1e-9;
    t > eps && t < 1.0 - eps && u > eps && u < 1.0 - eps
}
