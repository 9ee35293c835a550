//! Contours to job items.
//!
//! Every vertex after the first of a path is a straight segment; curves were flattened upstream.
//! Orientation is copied as-is so a non-zero fill tells outer boundaries from holes.

use pcb2laser_geometry::{Contour, Geometry, Point, Shape};
use serde::{Deserialize, Serialize};

use crate::layers::CutLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Move,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathVertex {
    pub point: Point,
    pub kind: SegmentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPath {
    pub layer: CutLayer,
    pub closed: bool,
    pub vertices: Vec<PathVertex>,
}

impl CutPath {
    /// Closed path tracing `contour` in its own order.
    #[must_use]
    pub fn from_contour(layer: CutLayer, contour: &Contour) -> Self {
        Self {
            layer,
            closed: true,
            vertices: vertices(contour.points()),
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.vertices.iter().map(|v| v.point)
    }

    /// Rebuild the contour this path was emitted from.
    #[must_use]
    pub fn to_contour(&self) -> Contour {
        Contour::new(self.points().collect())
    }
}

fn vertices(points: &[Point]) -> Vec<PathVertex> {
    points
        .iter()
        .enumerate()
        .map(|(i, &point)| PathVertex {
            point,
            kind: if i == 0 {
                SegmentKind::Move
            } else {
                SegmentKind::Line
            },
        })
        .collect()
}

/// One face drawn as a unit: outer boundary first, then its holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillGroup {
    pub layer: CutLayer,
    pub contours: Vec<CutPath>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobItem {
    Path(CutPath),
    FillGroup(FillGroup),
}

impl JobItem {
    #[must_use]
    pub fn layer(&self) -> CutLayer {
        match self {
            JobItem::Path(p) => p.layer,
            JobItem::FillGroup(g) => g.layer,
        }
    }

    /// Every contour carried by this item, in emission order.
    #[must_use]
    pub fn contours(&self) -> Vec<Contour> {
        match self {
            JobItem::Path(p) if p.closed => vec![p.to_contour()],
            JobItem::Path(_) => Vec::new(),
            JobItem::FillGroup(g) => g.contours.iter().map(CutPath::to_contour).collect(),
        }
    }
}

/// Items for one shape on `layer`.
///
/// Fill layers get a single group; cut layers get one path per contour.
#[must_use]
pub fn emit_shape(layer: CutLayer, shape: &Shape) -> Vec<JobItem> {
    let contours = std::iter::once(&shape.outer).chain(&shape.holes);
    if layer.supports_fill_groups() {
        return vec![JobItem::FillGroup(FillGroup {
            layer,
            contours: contours.map(|c| CutPath::from_contour(layer, c)).collect(),
        })];
    }
    contours
        .map(|c| JobItem::Path(CutPath::from_contour(layer, c)))
        .collect()
}

/// Items for several faces, each emitted independently.
#[must_use]
pub fn emit_shapes(layer: CutLayer, shapes: &[Shape]) -> Vec<JobItem> {
    shapes.iter().flat_map(|s| emit_shape(layer, s)).collect()
}

#[must_use]
pub fn emit_geometry(layer: CutLayer, geometry: &Geometry) -> Vec<JobItem> {
    emit_shape(layer, &geometry.clone().into_shape())
}
