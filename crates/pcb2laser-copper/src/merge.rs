//! Per-net union of registered copper into islands.

use pcb2laser_geometry::{Geometry, Kernel};
use tracing::{debug, warn};

use crate::registry::{CopperLayer, NetId, NetRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    /// Nothing registered.
    Empty,
    /// One geometry, passed through without a kernel call.
    Single,
    /// Union succeeded; one part per disjoint face.
    Merged,
    /// Union failed; the registered geometries are returned as they were.
    Unmerged,
}

/// Disjoint copper areas of one `(layer, net)` bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Island {
    pub parts: Vec<Geometry>,
    pub status: MergeStatus,
}

impl Island {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.parts.iter().map(Geometry::area).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedNet {
    pub layer: CopperLayer,
    pub net: NetId,
    pub island: Island,
}

pub struct NetMerger<'k> {
    kernel: &'k Kernel,
}

impl<'k> NetMerger<'k> {
    #[must_use]
    pub fn new(kernel: &'k Kernel) -> Self {
        Self { kernel }
    }

    /// Union everything registered for `(layer, net)`.
    ///
    /// Never fails: a kernel error is logged and the bucket comes back unmerged.
    pub fn merge_net(&self, registry: &NetRegistry, layer: CopperLayer, net: &NetId) -> Island {
        merge_geometries(self.kernel, registry.bucket(layer, net), layer, net)
    }

    /// Merge every bucket in registry order. Empty buckets are skipped.
    pub fn merge_all(&self, registry: &NetRegistry) -> Vec<MergedNet> {
        registry
            .iter()
            .filter_map(|((layer, net), bucket)| {
                let island = merge_geometries(self.kernel, bucket, *layer, net);
                if island.is_empty() {
                    return None;
                }
                Some(MergedNet {
                    layer: *layer,
                    net: net.clone(),
                    island,
                })
            })
            .collect()
    }
}

fn merge_geometries(kernel: &Kernel, bucket: &[Geometry], layer: CopperLayer, net: &NetId) -> Island {
    match bucket {
        [] => Island {
            parts: Vec::new(),
            status: MergeStatus::Empty,
        },
        [only] => Island {
            parts: vec![only.clone()],
            status: MergeStatus::Single,
        },
        _ => match kernel.union_geometries(bucket) {
            Ok(merged) => {
                debug!(%layer, %net, inputs = bucket.len(), islands = merged.face_count(), "merged net");
                Island {
                    parts: merged.to_geometries(),
                    status: MergeStatus::Merged,
                }
            }
            Err(err) => {
                warn!(%layer, %net, error = %err, "union failed, emitting unmerged geometry");
                Island {
                    parts: bucket.to_vec(),
                    status: MergeStatus::Unmerged,
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pcb2laser_geometry::{Contour, KernelOptions, Point, Rect, trace_outline};

    fn kernel() -> Kernel {
        Kernel::new(KernelOptions::default())
    }

    #[test]
    fn empty_bucket_gives_empty_island() {
        let k = kernel();
        let mut reg = NetRegistry::new();
        let net = NetId::from("GND");
        reg.ensure_net(&net);
        let island = NetMerger::new(&k).merge_net(&reg, CopperLayer::Top, &net);
        assert!(island.is_empty());
        assert_eq!(island.status, MergeStatus::Empty);
    }

    #[test]
    fn singleton_bucket_is_returned_unchanged() {
        let k = kernel();
        let mut reg = NetRegistry::new();
        let net = NetId::from("GND");
        let g: Geometry = Rect::centered(Point::new(1.0, 2.0), 3.0, 4.0).into();
        reg.register(CopperLayer::Top, &net, g.clone());
        let island = NetMerger::new(&k).merge_net(&reg, CopperLayer::Top, &net);
        assert_eq!(island.parts, vec![g]);
        assert_eq!(island.status, MergeStatus::Single);
        assert_eq!(k.live_shapes(), 0);
    }

    #[test]
    fn pads_joined_by_trace_form_one_island() {
        let k = kernel();
        let mut reg = NetRegistry::new();
        let net = NetId::from("SIG");
        let layer = CopperLayer::Top;
        reg.register(layer, &net, Rect::centered(Point::new(-5.0, 0.0), 2.0, 2.0).into());
        reg.register(layer, &net, Rect::centered(Point::new(5.0, 0.0), 2.0, 2.0).into());
        let trace = trace_outline(&[Point::new(-5.0, 0.0), Point::new(5.0, 0.0)], 0.5).unwrap();
        reg.register(layer, &net, trace.into());

        let island = NetMerger::new(&k).merge_net(&reg, layer, &net);
        assert_eq!(island.status, MergeStatus::Merged);
        assert_eq!(island.parts.len(), 1);
        // Pads 4 + 4, trace 5, minus the two 1 x 0.5 stubs inside the pads.
        assert_relative_eq!(island.area(), 12.0, max_relative = 1e-9);
    }

    #[test]
    fn disconnected_parts_become_separate_islands() {
        let k = kernel();
        let mut reg = NetRegistry::new();
        let net = NetId::from("SIG");
        reg.register(CopperLayer::Bottom, &net, Rect::centered(Point::new(0.0, 0.0), 1.0, 1.0).into());
        reg.register(CopperLayer::Bottom, &net, Rect::centered(Point::new(5.0, 0.0), 1.0, 1.0).into());
        let island = NetMerger::new(&k).merge_net(&reg, CopperLayer::Bottom, &net);
        assert_eq!(island.parts.len(), 2);
    }

    #[test]
    fn union_failure_falls_back_to_originals() {
        let k = kernel();
        let mut reg = NetRegistry::new();
        let net = NetId::from("BAD");
        let bow = |dx: f64| -> Geometry {
            Contour::new(vec![
                Point::new(dx, 0.0),
                Point::new(dx + 2.0, 2.0),
                Point::new(dx + 2.0, 0.0),
                Point::new(dx, 2.0),
            ])
            .into()
        };
        reg.register(CopperLayer::Top, &net, bow(0.0));
        reg.register(CopperLayer::Top, &net, bow(1.0));
        let island = NetMerger::new(&k).merge_net(&reg, CopperLayer::Top, &net);
        assert_eq!(island.status, MergeStatus::Unmerged);
        assert_eq!(island.parts, vec![bow(0.0), bow(1.0)]);
        assert_eq!(k.live_shapes(), 0);
    }

    #[test]
    fn merge_all_skips_empty_buckets() {
        let k = kernel();
        let mut reg = NetRegistry::new();
        let a = NetId::from("A");
        reg.ensure_net(&a);
        reg.register(CopperLayer::Top, &a, Rect::centered(Point::default(), 1.0, 1.0).into());
        let merged = NetMerger::new(&k).merge_all(&reg);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].layer, CopperLayer::Top);
        assert_eq!(merged[0].net, a);
    }
}
