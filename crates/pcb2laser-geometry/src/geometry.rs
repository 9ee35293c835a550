use serde::{Deserialize, Serialize};

use crate::contour::{Bounds, Contour, Winding};
use crate::point::Point;

/// One outer boundary plus the holes cut out of it.
///
/// Construction normalizes orientation: the outer contour is positive, every hole negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub outer: Contour,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Contour>,
}

impl Shape {
    #[must_use]
    pub fn new(outer: Contour, holes: Vec<Contour>) -> Self {
        Self {
            outer: outer.with_winding(Winding::Positive),
            holes: holes
                .into_iter()
                .map(|h| h.with_winding(Winding::Negative))
                .collect(),
        }
    }

    #[must_use]
    pub fn solid(outer: Contour) -> Self {
        Self::new(outer, Vec::new())
    }

    /// Enclosed area: outer minus holes.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(Contour::area).sum::<f64>()
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.outer.contains(p) && !self.holes.iter().any(|h| h.contains(p))
    }
}

/// Axis-aligned rectangle, kept apart from [`Shape`] so the common pad case never builds points
/// until a boolean operation needs them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        let half = Point::new(width / 2.0, height / 2.0);
        Self::new(center - half, center + half)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Counter-clockwise outline starting at the minimum corner.
    #[must_use]
    pub fn to_contour(&self) -> Contour {
        Contour::new(vec![
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ])
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Copper geometry contributed by one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Shape(Shape),
    Rect(Rect),
}

impl Geometry {
    /// Flatten to contours, outer boundary first.
    #[must_use]
    pub fn to_contours(&self) -> Vec<Contour> {
        match self {
            Geometry::Shape(shape) => {
                let mut out = Vec::with_capacity(1 + shape.holes.len());
                out.push(shape.outer.clone());
                out.extend(shape.holes.iter().cloned());
                out
            }
            Geometry::Rect(rect) => vec![rect.to_contour()],
        }
    }

    #[must_use]
    pub fn into_shape(self) -> Shape {
        match self {
            Geometry::Shape(shape) => shape,
            Geometry::Rect(rect) => Shape::solid(rect.to_contour()),
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Shape(shape) => shape.area(),
            Geometry::Rect(rect) => rect.area(),
        }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Geometry::Shape(shape) => shape.contains(p),
            Geometry::Rect(rect) => rect.contains(p),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Geometry::Shape(shape) => shape.outer.bounds(),
            Geometry::Rect(rect) => Some(Bounds {
                min: rect.min,
                max: rect.max,
            }),
        }
    }
}

impl From<Shape> for Geometry {
    fn from(shape: Shape) -> Self {
        Geometry::Shape(shape)
    }
}

impl From<Rect> for Geometry {
    fn from(rect: Rect) -> Self {
        Geometry::Rect(rect)
    }
}

impl From<Contour> for Geometry {
    fn from(contour: Contour) -> Self {
        Geometry::Shape(Shape::solid(contour))
    }
}
