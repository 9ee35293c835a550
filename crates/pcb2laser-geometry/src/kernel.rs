//! Process-wide boolean/offset kernel.
//!
//! The kernel is initialised once per process ([`Kernel::init`] or lazily through
//! [`Kernel::global`]) and hands out [`KernelShape`] results. Each result is counted while alive;
//! the count is released in `Drop`, so early returns and unwinding never leak it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contour::{Contour, ContourProblem};
use crate::geometry::{Geometry, Shape};
use crate::region::{Pline, Region, RegionError, pline_from_points};

static KERNEL: OnceLock<Kernel> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelOptions {
    /// Distance below which boundaries are considered touching.
    pub tolerance: f64,
    /// Maximum chord error when arcs are flattened into segments.
    pub arc_tolerance: f64,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            arc_tolerance: 0.005,
        }
    }
}

/// Which contours fill when unioning a contour set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    /// Positively wound contours fill, negatively wound ones cut.
    #[default]
    Positive,
    /// Every contour fills, whatever its winding.
    NonZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStyle {
    #[default]
    Round,
    Miter,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FailureReason {
    #[error("contour {index} is invalid: {problem}")]
    InvalidContour {
        index: usize,
        problem: ContourProblem,
    },
    #[error("{0}")]
    Rejected(String),
    #[error("kernel panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("union failed: {0}")]
    Union(FailureReason),
    #[error("offset failed: {0}")]
    Offset(FailureReason),
    #[error("difference failed: {0}")]
    Difference(FailureReason),
}

#[derive(Debug)]
pub struct Kernel {
    options: KernelOptions,
    live: AtomicUsize,
}

impl Kernel {
    /// A standalone kernel, independent of the process-wide one.
    #[must_use]
    pub fn new(options: KernelOptions) -> Self {
        Self {
            options,
            live: AtomicUsize::new(0),
        }
    }

    /// Boot step: install the process-wide kernel with `options`.
    ///
    /// Only the first call has an effect; later calls return the kernel already installed.
    pub fn init(options: KernelOptions) -> &'static Kernel {
        KERNEL.get_or_init(|| {
            debug!(?options, "initialising geometry kernel");
            Kernel::new(options)
        })
    }

    /// The process-wide kernel, created with default options on first use.
    pub fn global() -> &'static Kernel {
        Self::init(KernelOptions::default())
    }

    #[must_use]
    pub fn options(&self) -> KernelOptions {
        self.options
    }

    /// Number of [`KernelShape`] results currently alive.
    #[must_use]
    pub fn live_shapes(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn wrap(&self, region: Region) -> KernelShape<'_> {
        self.live.fetch_add(1, Ordering::SeqCst);
        KernelShape {
            kernel: self,
            region,
        }
    }

    /// An empty result.
    #[must_use]
    pub fn empty(&self) -> KernelShape<'_> {
        self.wrap(Region::empty())
    }

    /// Union of a contour set under `rule`.
    ///
    /// `NonZero` fills every contour. `Positive` unions the positively wound contours and
    /// subtracts the union of the negatively wound ones.
    pub fn union(&self, contours: &[Contour], rule: FillRule) -> Result<KernelShape<'_>, KernelError> {
        validate_all(contours).map_err(KernelError::Union)?;

        let (filled, cut): (Vec<&Contour>, Vec<&Contour>) = match rule {
            FillRule::NonZero => (contours.iter().collect(), Vec::new()),
            FillRule::Positive => contours.iter().partition(|c| c.signed_area() > 0.0),
        };

        let tol = self.options.tolerance;
        let region = guarded(|| {
            let base = Region::union_solids(plines_of(&filled), tol)?;
            if cut.is_empty() || base.is_empty() {
                return Ok(base);
            }
            base.difference(&Region::union_solids(plines_of(&cut), tol)?, tol)
        })
        .map_err(KernelError::Union)?;
        Ok(self.wrap(region))
    }

    /// Left fold of pairwise unions over `geometries`, in order.
    pub fn union_geometries(&self, geometries: &[Geometry]) -> Result<KernelShape<'_>, KernelError> {
        let mut regions: Vec<Region> = Vec::with_capacity(geometries.len());
        let mut index = 0usize;
        for g in geometries {
            let shape = g.clone().into_shape();
            for c in std::iter::once(&shape.outer).chain(&shape.holes) {
                c.validate()
                    .map_err(|problem| KernelError::Union(FailureReason::InvalidContour { index, problem }))?;
                index += 1;
            }
            regions.push(Region::from_shape(&shape.outer, &shape.holes));
        }

        let tol = self.options.tolerance;
        let region = guarded(|| {
            let mut iter = regions.into_iter();
            let Some(mut acc) = iter.next() else {
                return Ok(Region::empty());
            };
            for next in iter {
                acc = acc.union(&next, tol)?;
            }
            Ok(acc)
        })
        .map_err(KernelError::Union)?;
        Ok(self.wrap(region))
    }
}

/// A kernel-owned result.
#[derive(Debug)]
pub struct KernelShape<'k> {
    kernel: &'k Kernel,
    region: Region,
}

impl<'k> KernelShape<'k> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Number of disjoint faces (islands).
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.region.faces.len()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.region.area()
    }

    /// Signed offset; positive `delta` grows the filled area.
    pub fn offset(&self, delta: f64, join: JoinStyle) -> Result<KernelShape<'k>, KernelError> {
        if !delta.is_finite() {
            return Err(KernelError::Offset(FailureReason::Rejected(
                "non-finite offset distance".to_string(),
            )));
        }
        let opts = self.kernel.options;
        let region = guarded(|| match join {
            JoinStyle::Round => self.region.offset_round(delta, opts.tolerance),
            JoinStyle::Miter => self.region.offset_miter(delta, opts.arc_tolerance),
        })
        .map_err(KernelError::Offset)?;
        Ok(self.kernel.wrap(region))
    }

    /// `self − other`.
    pub fn difference(&self, other: &KernelShape<'_>) -> Result<KernelShape<'k>, KernelError> {
        let tol = self.kernel.options.tolerance;
        let region = guarded(|| self.region.difference(&other.region, tol))
            .map_err(KernelError::Difference)?;
        Ok(self.kernel.wrap(region))
    }

    /// Remove redundant vertices and contours thinner than `tolerance`.
    #[must_use]
    pub fn simplify(mut self, tolerance: f64) -> KernelShape<'k> {
        let region = std::mem::take(&mut self.region).simplify(tolerance);
        self.kernel.wrap(region)
    }

    /// One [`Shape`] per face: outer positive, holes negative.
    #[must_use]
    pub fn to_shapes(&self) -> Vec<Shape> {
        self.region
            .to_contours(self.kernel.options.arc_tolerance)
            .into_iter()
            .map(|(outer, holes)| Shape::new(outer, holes))
            .collect()
    }

    /// Every contour of every face, outer boundary before its holes.
    #[must_use]
    pub fn to_contours(&self) -> Vec<Contour> {
        self.to_shapes()
            .into_iter()
            .flat_map(|s| std::iter::once(s.outer).chain(s.holes))
            .collect()
    }

    #[must_use]
    pub fn to_geometries(&self) -> Vec<Geometry> {
        self.to_shapes().into_iter().map(Geometry::Shape).collect()
    }
}

impl Drop for KernelShape<'_> {
    fn drop(&mut self) {
        self.kernel.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn plines_of(contours: &[&Contour]) -> Vec<Pline> {
    contours.iter().map(|c| pline_from_points(c.points())).collect()
}

fn validate_all(contours: &[Contour]) -> Result<(), FailureReason> {
    for (index, c) in contours.iter().enumerate() {
        c.validate()
            .map_err(|problem| FailureReason::InvalidContour { index, problem })?;
    }
    Ok(())
}

/// Run one kernel operation, turning both rejections and panics into a [`FailureReason`].
fn guarded<T>(op: impl FnOnce() -> Result<T, RegionError>) -> Result<T, FailureReason> {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(FailureReason::Rejected(e.to_string())),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(FailureReason::Panicked(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::point::Point;
    use approx::assert_relative_eq;

    fn square(cx: f64, cy: f64, size: f64) -> Contour {
        Rect::centered(Point::new(cx, cy), size, size).to_contour()
    }

    #[test]
    fn global_kernel_is_initialised_once() {
        let a = Kernel::global();
        let b = Kernel::init(KernelOptions {
            tolerance: 0.5,
            arc_tolerance: 0.5,
        });
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.options(), b.options());
    }

    #[test]
    fn live_count_tracks_results() {
        let k = Kernel::new(KernelOptions::default());
        {
            let a = k.union(&[square(0.0, 0.0, 2.0)], FillRule::NonZero).unwrap();
            let b = a.offset(0.5, JoinStyle::Miter).unwrap();
            assert_eq!(k.live_shapes(), 2);
            let c = b.difference(&a).unwrap().simplify(0.001);
            assert_eq!(k.live_shapes(), 3);
            assert_relative_eq!(c.area(), 5.0, max_relative = 1e-9);
        }
        assert_eq!(k.live_shapes(), 0);
    }

    #[test]
    fn live_count_released_on_error_path() {
        let k = Kernel::new(KernelOptions::default());
        let bow = Contour::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
        ]);
        let run = || -> Result<f64, KernelError> {
            let a = k.union(&[square(0.0, 0.0, 2.0)], FillRule::NonZero)?;
            let b = k.union(&[bow.clone()], FillRule::NonZero)?;
            Ok(a.difference(&b)?.area())
        };
        let err = run().unwrap_err();
        assert!(matches!(
            err,
            KernelError::Union(FailureReason::InvalidContour {
                index: 0,
                problem: ContourProblem::SelfIntersecting
            })
        ));
        assert_eq!(k.live_shapes(), 0);
    }

    #[test]
    fn positive_rule_subtracts_negative_contours() {
        let k = Kernel::new(KernelOptions::default());
        let outer = square(0.0, 0.0, 4.0);
        let hole = square(0.0, 0.0, 2.0).reversed();
        let r = k.union(&[hole, outer], FillRule::Positive).unwrap();
        assert_eq!(r.face_count(), 1);
        assert_relative_eq!(r.area(), 12.0, max_relative = 1e-9);
        let shapes = r.to_shapes();
        assert!(shapes[0].outer.is_outer());
        assert!(!shapes[0].holes[0].is_outer());
    }

    #[test]
    fn nonzero_rule_fills_doubly_wound_area() {
        let k = Kernel::new(KernelOptions::default());
        let r = k
            .union(
                &[square(0.0, 0.0, 4.0), square(0.0, 0.0, 2.0)],
                FillRule::NonZero,
            )
            .unwrap();
        assert_relative_eq!(r.area(), 16.0, max_relative = 1e-9);
        let neg = k
            .union(&[square(0.0, 0.0, 4.0).reversed()], FillRule::Positive)
            .unwrap();
        assert!(neg.is_empty());
    }

    #[test]
    fn partly_overlapping_contours_keep_the_overhang() {
        let k = Kernel::new(KernelOptions::default());
        let big = square(0.0, 0.0, 4.0);
        let small = square(1.5, 0.0, 2.0);
        for rule in [FillRule::NonZero, FillRule::Positive] {
            let r = k.union(&[big.clone(), small.clone()], rule).unwrap();
            assert_eq!(r.face_count(), 1);
            assert_relative_eq!(r.area(), 16.0 + 4.0 - 3.0, max_relative = 1e-9);
            assert!(r.to_shapes()[0].contains(Point::new(2.25, 0.0)));
        }
        assert_eq!(k.live_shapes(), 0);
    }

    #[test]
    fn positive_rule_cuts_partly_overlapping_negative() {
        let k = Kernel::new(KernelOptions::default());
        let r = k
            .union(
                &[square(0.0, 0.0, 4.0), square(1.5, 0.0, 2.0).reversed()],
                FillRule::Positive,
            )
            .unwrap();
        assert_eq!(r.face_count(), 1);
        assert_relative_eq!(r.area(), 13.0, max_relative = 1e-9);
        assert!(!r.to_shapes()[0].contains(Point::new(1.0, 0.0)));
    }

    #[test]
    fn union_geometries_splits_disjoint_faces() {
        let k = Kernel::new(KernelOptions::default());
        let geoms: Vec<Geometry> = vec![
            Rect::centered(Point::new(0.0, 0.0), 2.0, 2.0).into(),
            Rect::centered(Point::new(1.0, 0.0), 2.0, 2.0).into(),
            Rect::centered(Point::new(10.0, 0.0), 2.0, 2.0).into(),
        ];
        let r = k.union_geometries(&geoms).unwrap();
        assert_eq!(r.face_count(), 2);
        assert_relative_eq!(r.area(), 6.0 + 4.0, max_relative = 1e-9);
    }
}
