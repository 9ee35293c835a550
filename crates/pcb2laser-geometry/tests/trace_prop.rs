use pcb2laser_geometry::contour::distance_to_segment;
use pcb2laser_geometry::trace::trace_outline;
use pcb2laser_geometry::Point;
use proptest::prelude::*;

const MAX_TURN_DEG: f64 = 45.0;

/// Polyline whose turns stay within `MAX_TURN_DEG`, so it never folds back over itself.
fn centerline(start: Point, heading: f64, segments: &[(f64, f64)]) -> Vec<Point> {
    let mut pts = vec![start];
    let mut dir = heading;
    let mut at = start;
    for &(len, turn_deg) in segments {
        at = at + Point::new(dir.cos(), dir.sin()) * len;
        pts.push(at);
        dir += turn_deg.to_radians();
    }
    pts
}

fn distance_to_centerline(p: Point, pts: &[Point]) -> f64 {
    pts.windows(2)
        .map(|w| distance_to_segment(p, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

proptest! {
    #[test]
    fn outline_encloses_the_centerline(
        x in -10.0f64..10.0,
        y in -10.0f64..10.0,
        heading in 0.0f64..std::f64::consts::TAU,
        segments in prop::collection::vec((2.0f64..6.0, -MAX_TURN_DEG..MAX_TURN_DEG), 1..5),
        width in 0.1f64..1.0,
    ) {
        let pts = centerline(Point::new(x, y), heading, &segments);
        let outline = trace_outline(&pts, width).unwrap();
        prop_assert!(outline.is_outer());
        prop_assert!(!outline.is_self_intersecting());

        let half = width / 2.0;
        let eps = 1e-9;
        // Interior vertices and segment midpoints sit a full half-width inside.
        let interior = pts[1..pts.len() - 1]
            .iter()
            .copied()
            .chain(pts.windows(2).map(|w| w[0].midpoint(w[1])));
        for p in interior {
            prop_assert!(outline.contains(p));
            prop_assert!(outline.distance_to_boundary(p) >= half - eps);
        }
        // Endpoints lie on the flat caps.
        for p in [pts[0], pts[pts.len() - 1]] {
            prop_assert!(outline.distance_to_boundary(p) <= eps);
        }
        // No outline vertex strays further than the widest miter.
        let reach = half / (MAX_TURN_DEG.to_radians() / 2.0).cos() + eps;
        for &v in outline.points() {
            prop_assert!(distance_to_centerline(v, &pts) <= reach);
        }
    }
}
