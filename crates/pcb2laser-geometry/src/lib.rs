//! 2D geometry primitives and operations.

pub mod contour;
pub mod geometry;
pub mod kernel;
pub mod point;
pub mod primitives;
mod region;
pub mod trace;

pub use contour::{Bounds, Contour, ContourProblem, Winding};
pub use geometry::{Geometry, Rect, Shape};
pub use kernel::{FailureReason, FillRule, JoinStyle, Kernel, KernelError, KernelOptions, KernelShape};
pub use point::Point;
pub use trace::{TraceError, trace_outline};
