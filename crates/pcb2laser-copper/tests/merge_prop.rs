use pcb2laser_copper::{CopperLayer, MergeStatus, NetId, NetMerger, NetRegistry};
use pcb2laser_geometry::primitives::rectangle;
use pcb2laser_geometry::{Geometry, Kernel, KernelOptions, Point};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Geometry> {
    (-5.0f64..5.0, -5.0f64..5.0, 0.5f64..4.0, 0.5f64..4.0)
        .prop_map(|(x, y, w, h)| rectangle(Point::new(x, y), (w, h), 0.0))
}

proptest! {
    #[test]
    fn merged_area_does_not_depend_on_registration_order(
        rects in prop::collection::vec(rect_strategy(), 2..5),
    ) {
        let k = Kernel::new(KernelOptions::default());
        let net = NetId::from("N");

        let mut forward = NetRegistry::new();
        for r in &rects {
            forward.register(CopperLayer::Top, &net, r.clone());
        }
        let mut backward = NetRegistry::new();
        for r in rects.iter().rev() {
            backward.register(CopperLayer::Top, &net, r.clone());
        }

        let merger = NetMerger::new(&k);
        let a = merger.merge_net(&forward, CopperLayer::Top, &net);
        let b = merger.merge_net(&backward, CopperLayer::Top, &net);
        prop_assert_eq!(a.status, MergeStatus::Merged);
        prop_assert_eq!(b.status, MergeStatus::Merged);
        prop_assert!((a.area() - b.area()).abs() <= 1e-6 * a.area().max(1.0));

        let max_single = rects.iter().map(Geometry::area).fold(0.0, f64::max);
        let sum: f64 = rects.iter().map(Geometry::area).sum();
        prop_assert!(a.area() >= max_single - 1e-9);
        prop_assert!(a.area() <= sum + 1e-9);
    }
}
