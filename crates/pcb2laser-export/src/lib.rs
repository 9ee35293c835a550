//! Laser job output: fixed layer table, path emitter, JSON job document and SVG preview.

pub mod emit;
pub mod job;
pub mod layers;
pub mod svg;

pub use emit::{CutPath, FillGroup, JobItem, PathVertex, SegmentKind, emit_geometry, emit_shape, emit_shapes};
pub use job::{ExportError, LaserJob};
pub use layers::{CutLayer, Operation};
pub use svg::{SvgError, svg_from_job};
