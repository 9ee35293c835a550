//! Region algebra over cavalier_contours polylines.
//!
//! A [`Region`] is a list of disjoint faces. Every polyline stored here is counter-clockwise,
//! holes included; hole orientation is only applied when contours are extracted. Islands that sit
//! inside another face's hole are separate faces.

use cavalier_contours::polyline::{
    BooleanOp, BooleanResult, BooleanResultInfo, PlineOffsetOptions, PlineOrientation,
    PlineSource, PlineSourceMut, PlineVertex, Polyline, seg_arc_radius_and_center,
};
use tracing::debug;

use crate::contour::{Bounds, Contour, winding_number};
use crate::point::{Point, segments_cross};
use crate::primitives::arc_segments;

pub(crate) type Pline = Polyline<f64>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RegionError {
    #[error("polyline rejected by the boolean engine")]
    InvalidInput,
    #[error("offset contour intersects itself")]
    SelfIntersectingOffset,
}

#[derive(Debug, Clone)]
pub(crate) struct Face {
    pub outer: Pline,
    pub holes: Vec<Pline>,
}

impl Face {
    fn solid(outer: Pline) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Region {
    pub faces: Vec<Face>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn solids(plines: Vec<Pline>) -> Self {
        Self {
            faces: plines.into_iter().map(|p| Face::solid(ccw(p))).collect(),
        }
    }

    pub fn from_shape(outer: &Contour, holes: &[Contour]) -> Self {
        Self {
            faces: vec![Face {
                outer: pline_from_points(outer.points()),
                holes: holes.iter().map(|h| pline_from_points(h.points())).collect(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| f.outer.area().abs() - f.holes.iter().map(|h| h.area().abs()).sum::<f64>())
            .sum()
    }

    /// Assign each hole to the smallest outer that contains it.
    pub fn from_parts(pos: Vec<Pline>, neg: Vec<Pline>, tol: f64) -> Self {
        let mut faces: Vec<Face> = pos.into_iter().map(|p| Face::solid(ccw(p))).collect();
        if neg.is_empty() {
            return Self { faces };
        }

        let outer_pts: Vec<Vec<Point>> = faces.iter().map(|f| tessellate(&f.outer, tol)).collect();
        let outer_area: Vec<f64> = faces.iter().map(|f| f.outer.area().abs()).collect();

        for hole in neg {
            let hole = ccw(hole);
            let hole_area = hole.area().abs();
            let sample = Contour::new(tessellate(&hole, tol)).interior_point();
            let owner = (0..faces.len())
                .filter(|&i| outer_area[i] > hole_area)
                .filter(|&i| winding_number(sample, &outer_pts[i]) != 0)
                .min_by(|&a, &b| outer_area[a].total_cmp(&outer_area[b]));
            match owner {
                Some(i) => faces[i].holes.push(hole),
                None => debug!(area = hole_area, "dropping hole with no enclosing outer"),
            }
        }
        Self { faces }
    }

    /// Union with `other`.
    ///
    /// Outer boundaries are merged pairwise; the holes of the result are the enclosed regions
    /// covered by neither operand.
    pub fn union(&self, other: &Region, tol: f64) -> Result<Region, RegionError> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }

        let outers: Vec<Pline> = self
            .faces
            .iter()
            .chain(&other.faces)
            .map(|f| f.outer.clone())
            .collect();
        let (merged, created) = union_plines(outers)?;

        let mut hole_faces: Vec<Face> = Vec::new();
        if !created.is_empty() {
            let enclosed = Region::solids(created)
                .difference(self, tol)?
                .difference(other, tol)?;
            hole_faces.extend(enclosed.faces);
        }
        for (ours, theirs) in [(self, other), (other, self)] {
            for face in &ours.faces {
                for h in &face.holes {
                    let mut uncovered = Region::solids(vec![h.clone()]).difference(theirs, tol)?;
                    let islands = ours.islands_within(h, tol);
                    if !islands.is_empty() {
                        uncovered = uncovered.difference(&islands, tol)?;
                    }
                    hole_faces.extend(uncovered.faces);
                }
            }
        }

        let outer_region = Region::solids(merged);
        if hole_faces.is_empty() {
            return Ok(outer_region);
        }
        outer_region.difference(&Region { faces: hole_faces }, tol)
    }

    /// Faces of this region lying inside the hole `h` of another of its faces.
    fn islands_within(&self, h: &Pline, tol: f64) -> Region {
        let h_pts = tessellate(h, tol);
        let h_area = h.area().abs();
        let faces = self
            .faces
            .iter()
            .filter(|f| f.outer.area().abs() < h_area)
            .filter(|f| {
                let sample = Contour::new(tessellate(&f.outer, tol)).interior_point();
                winding_number(sample, &h_pts) != 0
            })
            .cloned()
            .collect();
        Region { faces }
    }

    /// Union of independent solid polylines.
    pub fn union_solids(plines: Vec<Pline>, tol: f64) -> Result<Region, RegionError> {
        let inputs: Vec<Pline> = plines.into_iter().map(ccw).collect();
        let (merged, created) = union_plines(inputs.clone())?;
        let outer_region = Region::solids(merged);
        if created.is_empty() {
            return Ok(outer_region);
        }
        let enclosed = Region::solids(created).difference(&Region::solids(inputs), tol)?;
        if enclosed.is_empty() {
            return Ok(outer_region);
        }
        outer_region.difference(&enclosed, tol)
    }

    /// `self − other`, evaluated face by face: `A − F = (A − F.outer) ∪ (A ∩ F.holes)`.
    pub fn difference(&self, other: &Region, tol: f64) -> Result<Region, RegionError> {
        let mut current = self.faces.clone();
        for cutter in &other.faces {
            let cutter_pts = tessellate(&cutter.outer, tol);
            let mut next: Vec<Face> = Vec::with_capacity(current.len());
            for face in current {
                let face_pts = tessellate(&face.outer, tol);
                if !interiors_overlap(&face_pts, &cutter_pts, tol) {
                    next.push(face);
                    continue;
                }
                next.extend(face_minus_pline(&face, &cutter.outer, tol)?);
                for h in &cutter.holes {
                    next.extend(face_intersect_pline(&face, h, tol)?);
                }
            }
            current = next;
        }
        Ok(Region { faces: current })
    }

    /// Round-joined offset; positive `delta` grows the filled area.
    pub fn offset_round(&self, delta: f64, tol: f64) -> Result<Region, RegionError> {
        if delta == 0.0 {
            return Ok(self.clone());
        }
        let abs = delta.abs();
        let grow = delta > 0.0;

        let opts = PlineOffsetOptions {
            handle_self_intersects: true,
            ..Default::default()
        };

        let mut outer_out: Vec<Pline> = Vec::new();
        let mut hole_out: Vec<Pline> = Vec::new();
        for face in &self.faces {
            let off = signed_offset_for(&face.outer, abs, !grow);
            let res: Vec<Pline> = face.outer.parallel_offset_opt(off, &opts);
            outer_out.extend(res.into_iter().map(ccw));
            for h in &face.holes {
                let off = signed_offset_for(h, abs, grow);
                let res: Vec<Pline> = h.parallel_offset_opt(off, &opts);
                hole_out.extend(res.into_iter().map(ccw));
            }
        }

        let out = Region::union_solids(outer_out, tol)?;
        if hole_out.is_empty() {
            return Ok(out);
        }
        out.difference(&Region::solids(hole_out), tol)
    }

    /// Miter-joined offset computed on the tessellated boundary.
    pub fn offset_miter(&self, delta: f64, tol: f64) -> Result<Region, RegionError> {
        if delta == 0.0 {
            return Ok(self.clone());
        }
        let mut outer_out: Vec<Pline> = Vec::new();
        let mut hole_out: Vec<Pline> = Vec::new();
        for face in &self.faces {
            let pts = miter_offset(&tessellate(&face.outer, tol), delta);
            if let Some(pts) = pts {
                outer_out.push(checked_pline(pts)?);
            }
            for h in &face.holes {
                if let Some(pts) = miter_offset(&tessellate(h, tol), -delta) {
                    hole_out.push(checked_pline(pts)?);
                }
            }
        }
        let out = Region::union_solids(outer_out, tol)?;
        if hole_out.is_empty() {
            return Ok(out);
        }
        out.difference(&Region::solids(hole_out), tol)
    }

    /// Collapse redundant vertices and drop sliver contours thinner than `tol`.
    pub fn simplify(self, tol: f64) -> Region {
        let faces = self
            .faces
            .into_iter()
            .filter_map(|face| {
                let outer = simplify_pline(face.outer, tol)?;
                let holes = face
                    .holes
                    .into_iter()
                    .filter_map(|h| simplify_pline(h, tol))
                    .collect();
                Some(Face { outer, holes })
            })
            .collect();
        Region { faces }
    }

    /// Extract as plain contours: `(outer, holes)` per face, outer positive, holes negative.
    pub fn to_contours(&self, tol: f64) -> Vec<(Contour, Vec<Contour>)> {
        self.faces
            .iter()
            .filter_map(|f| {
                let outer = Contour::new(tessellate(&f.outer, tol));
                if outer.len() < 3 {
                    return None;
                }
                let holes = f
                    .holes
                    .iter()
                    .map(|h| Contour::new(tessellate(h, tol)).reversed())
                    .filter(|h| h.len() >= 3)
                    .collect();
                Some((outer, holes))
            })
            .collect()
    }
}

pub(crate) fn pline_from_points(points: &[Point]) -> Pline {
    let mut pl = Polyline::new_closed();
    for p in points {
        pl.vertex_data.push(PlineVertex::new(p.x, p.y, 0.0));
    }
    ccw(pl)
}

fn checked_pline(points: Vec<Point>) -> Result<Pline, RegionError> {
    let c = Contour::new(points);
    if c.is_self_intersecting() {
        return Err(RegionError::SelfIntersectingOffset);
    }
    Ok(pline_from_points(c.points()))
}

fn ccw(mut pl: Pline) -> Pline {
    if pl.orientation() == PlineOrientation::Clockwise {
        pl.invert_direction_mut();
    }
    pl
}

/// Flatten arc segments (non-zero bulge) into chords within `tol` of the true arc.
pub(crate) fn tessellate(pl: &Pline, tol: f64) -> Vec<Point> {
    let n = pl.vertex_count();
    let mut out: Vec<Point> = Vec::with_capacity(n);
    for i in 0..n {
        let v1 = pl.at(i);
        out.push(Point::new(v1.x, v1.y));
        if v1.bulge_is_zero() || (i + 1 == n && !pl.is_closed()) {
            continue;
        }
        let v2 = pl.at((i + 1) % n);
        let (radius, center) = seg_arc_radius_and_center(v1, v2);
        let sweep = 4.0 * v1.bulge.atan();
        let start = (v1.y - center.y).atan2(v1.x - center.x);
        let steps = arc_segments(radius, sweep, tol);
        for k in 1..steps {
            let a = start + sweep * (k as f64) / (steps as f64);
            out.push(Point::new(
                center.x + radius * a.cos(),
                center.y + radius * a.sin(),
            ));
        }
    }
    out
}

fn boolean(a: &Pline, b: &Pline, op: BooleanOp) -> Result<BooleanResult<Pline>, RegionError> {
    let res: BooleanResult<Pline> = a.boolean(b, op);
    if matches!(res.result_info, BooleanResultInfo::InvalidInput) {
        return Err(RegionError::InvalidInput);
    }
    Ok(res)
}

/// Pairwise merge until stable. Returns the merged outers and every hole the merges enclosed.
fn union_pline_set_with_holes(mut plines: Vec<Pline>) -> Result<(Vec<Pline>, Vec<Pline>), RegionError> {
    plines.retain(|p| p.is_closed() && p.vertex_count() >= 2);

    let mut holes: Vec<Pline> = Vec::new();

    let mut i = 0usize;
    while i < plines.len() {
        let mut merged = false;
        let mut j = i + 1;
        while j < plines.len() {
            let res = boolean(&plines[i], &plines[j], BooleanOp::Or)?;
            if matches!(res.result_info, BooleanResultInfo::Disjoint) {
                j += 1;
                continue;
            }
            let mut next: Vec<Pline> = res.pos_plines.into_iter().map(|p| ccw(p.pline)).collect();
            holes.extend(res.neg_plines.into_iter().map(|p| ccw(p.pline)));

            // Replace plines[i] and plines[j] with the union results.
            plines.swap_remove(j);
            plines.swap_remove(i);
            plines.append(&mut next);
            merged = true;
            break;
        }
        if merged {
            i = 0;
        } else {
            i += 1;
        }
    }

    Ok((plines, holes))
}

fn union_plines(plines: Vec<Pline>) -> Result<(Vec<Pline>, Vec<Pline>), RegionError> {
    let (outers, holes) = union_pline_set_with_holes(plines)?;
    if holes.len() < 2 {
        return Ok((outers, holes));
    }
    // Holes recorded at different merge steps may overlap.
    let (holes, _) = union_pline_set_with_holes(holes)?;
    Ok((outers, holes))
}

/// Subtract disjoint `cutters` from every target. Returns remaining pieces and new holes.
fn subtract_plines(
    targets: Vec<Pline>,
    cutters: &[Pline],
    tol: f64,
) -> Result<(Vec<Pline>, Vec<Pline>), RegionError> {
    let mut cur_pos = targets;
    let mut cur_neg: Vec<Pline> = Vec::new();

    for c in cutters {
        let cutter_pts = tessellate(c, tol);
        let mut next_pos: Vec<Pline> = Vec::new();
        for cp in cur_pos {
            if !interiors_overlap(&tessellate(&cp, tol), &cutter_pts, tol) {
                next_pos.push(cp);
                continue;
            }
            let res = boolean(&cp, c, BooleanOp::Not)?;
            next_pos.extend(res.pos_plines.into_iter().map(|p| ccw(p.pline)));
            cur_neg.extend(res.neg_plines.into_iter().map(|p| ccw(p.pline)));
        }
        cur_pos = next_pos;
    }

    Ok((cur_pos, cur_neg))
}

fn intersect_plines(a: &Pline, b: &Pline) -> Result<Vec<Pline>, RegionError> {
    let res = boolean(a, b, BooleanOp::And)?;
    Ok(res.pos_plines.into_iter().map(|p| ccw(p.pline)).collect())
}

fn face_minus_pline(face: &Face, cutter: &Pline, tol: f64) -> Result<Vec<Face>, RegionError> {
    if face.holes.is_empty() {
        let (pos, neg) = subtract_plines(vec![face.outer.clone()], std::slice::from_ref(cutter), tol)?;
        return Ok(Region::from_parts(pos, neg, tol).faces);
    }

    let mut cutters = vec![cutter.clone()];
    cutters.extend(face.holes.iter().cloned());
    let (cut_outers, enclosed) = union_plines(cutters)?;
    let (pos, neg) = subtract_plines(vec![face.outer.clone()], &cut_outers, tol)?;
    let mut faces = Region::from_parts(pos, neg, tol).faces;
    // Area ringed by the cutters without being covered by them stays filled.
    for e in &enclosed {
        faces.extend(intersect_plines(&face.outer, e)?.into_iter().map(Face::solid));
    }
    Ok(faces)
}

fn face_intersect_pline(face: &Face, clip: &Pline, tol: f64) -> Result<Vec<Face>, RegionError> {
    let pieces = intersect_plines(&face.outer, clip)?;
    if face.holes.is_empty() {
        return Ok(pieces.into_iter().map(Face::solid).collect());
    }
    let (pos, neg) = subtract_plines(pieces, &face.holes, tol)?;
    Ok(Region::from_parts(pos, neg, tol).faces)
}

/// Cheap pre-check before handing two polylines to the boolean engine: true when one boundary
/// has a vertex strictly inside the other, or two edges properly cross.
fn interiors_overlap(a: &[Point], b: &[Point], tol: f64) -> bool {
    let (Some(ba), Some(bb)) = (Bounds::of(a), Bounds::of(b)) else {
        return false;
    };
    if !ba.overlaps(bb, tol) {
        return false;
    }
    let strictly_inside = |p: Point, poly: &[Point]| {
        winding_number(p, poly) != 0 && Contour::new(poly.to_vec()).distance_to_boundary(p) > tol
    };
    if a.iter().any(|&p| strictly_inside(p, b)) || b.iter().any(|&p| strictly_inside(p, a)) {
        return true;
    }
    let (ca, cb) = (Contour::new(a.to_vec()), Contour::new(b.to_vec()));
    if cb.contains(ca.interior_point()) || ca.contains(cb.interior_point()) {
        return true;
    }
    let na = a.len();
    let nb = b.len();
    for i in 0..na {
        let (a0, a1) = (a[i], a[(i + 1) % na]);
        for j in 0..nb {
            if segments_cross(a0, a1, b[j], b[(j + 1) % nb]) {
                return true;
            }
        }
    }
    false
}

fn signed_offset_for(pline: &Pline, abs: f64, inside: bool) -> f64 {
    match pline.orientation() {
        PlineOrientation::CounterClockwise => {
            // CCW: interior is on the left; left-offset is inward.
            if inside { abs } else { -abs }
        }
        PlineOrientation::Clockwise => {
            // CW: interior is on the right; left-offset is outward.
            if inside { -abs } else { abs }
        }
        PlineOrientation::Open => {
            if inside { abs } else { -abs }
        }
    }
}

/// Offset every edge of the counter-clockwise polygon `pts` by `delta` to its right (outward)
/// and join neighbours at their line intersection. Returns `None` when the polygon collapses.
fn miter_offset(pts: &[Point], delta: f64) -> Option<Vec<Point>> {
    let n = pts.len();
    if n < 3 {
        return None;
    }
    let mut edges: Vec<(Point, Point)> = Vec::with_capacity(n);
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        let Some(dir) = (b - a).normalized() else {
            continue;
        };
        let right = -dir.perp();
        edges.push((a + right * delta, dir));
    }
    let m = edges.len();
    if m < 3 {
        return None;
    }
    let mut out: Vec<Point> = Vec::with_capacity(m);
    for i in 0..m {
        let (p_prev, d_prev) = edges[(i + m - 1) % m];
        let (p_next, d_next) = edges[i];
        match crate::point::line_intersection(
            p_prev,
            d_prev,
            p_next,
            d_next,
            crate::trace::PARALLEL_EPS,
        ) {
            Some(p) => out.push(p),
            None => out.push(p_next),
        }
    }
    let c = Contour::new(out);
    // A shrink that flips orientation has collapsed.
    if c.signed_area() <= 0.0 {
        return None;
    }
    Some(c.into_points())
}

fn simplify_pline(p: Pline, tol: f64) -> Option<Pline> {
    let p = p.remove_redundant(tol).unwrap_or(p);
    if p.vertex_count() < 2 {
        return None;
    }
    let pts = tessellate(&p, tol);
    let c = Contour::new(pts);
    if c.len() < 3 {
        return None;
    }
    // Width of a thin strip is roughly 2 * area / perimeter.
    if c.area() <= tol * c.perimeter() / 2.0 {
        return None;
    }
    Some(p)
}
