//! SVG preview of a laser job.

use pcb2laser_geometry::Point;

use crate::emit::{CutPath, JobItem};
use crate::job::LaserJob;
use crate::layers::Operation;

#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    #[error("SVG preview requires at least one path")]
    Empty,
    #[error("job has zero width or height")]
    Degenerate,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Bounds {
    fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn update_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }

    fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
    }
}

/// Render `job` as one `<g>` per non-empty layer, in layer-table order.
///
/// Fill layers are painted with `fill-rule="nonzero"`; cut layers are stroked only.
pub fn svg_from_job(job: &LaserJob) -> Result<String, SvgError> {
    let mut bounds = Bounds::new();
    for item in job.items() {
        for path in item_paths(item) {
            for p in path.points() {
                bounds.update_point(p);
            }
        }
    }
    if !bounds.is_valid() {
        return Err(SvgError::Empty);
    }
    let width = bounds.max_x - bounds.min_x;
    let height = bounds.max_y - bounds.min_y;
    if width <= 0.0 || height <= 0.0 {
        return Err(SvgError::Degenerate);
    }

    let transform = |p: Point| Point::new(p.x - bounds.min_x, bounds.max_y - p.y);

    let mut body = String::new();
    for layer in job.layers_used() {
        let style = match layer.operation() {
            Operation::Fill => format!(
                "fill=\"{c}\" fill-rule=\"nonzero\" fill-opacity=\"0.6\" stroke=\"none\"",
                c = layer.color()
            ),
            Operation::Cut => format!(
                "fill=\"none\" stroke=\"{c}\" stroke-width=\"0.1mm\"",
                c = layer.color()
            ),
        };
        body.push_str(&format!(
            "<g id=\"layer-{idx}\" data-name=\"{name}\" {style}>",
            idx = layer.index(),
            name = layer.name(),
        ));
        for item in job.items_on(layer) {
            let mut d = String::new();
            for path in item_paths(item) {
                push_subpath(&mut d, &path_data(path, transform));
            }
            if !d.is_empty() {
                body.push_str(&format!("<path d=\"{d}\" vector-effect=\"non-scaling-stroke\"/>"));
            }
        }
        body.push_str("</g>");
    }

    Ok(format!(
        "<svg width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\">{body}</svg>",
        w = fmt_num(width),
        h = fmt_num(height),
    ))
}

fn item_paths(item: &JobItem) -> Vec<&CutPath> {
    match item {
        JobItem::Path(p) => vec![p],
        JobItem::FillGroup(g) => g.contours.iter().collect(),
    }
}

fn path_data(path: &CutPath, transform: impl Fn(Point) -> Point) -> String {
    let mut out = String::new();
    for (i, p) in path.points().enumerate() {
        let p = transform(p);
        let cmd = if i == 0 { "M" } else { "L" };
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{cmd} {} {}", fmt_num(p.x), fmt_num(p.y)));
    }
    if path.closed && !out.is_empty() {
        out.push_str(" Z");
    }
    out
}

fn push_subpath(path: &mut String, sub: &str) {
    if sub.is_empty() {
        return;
    }
    if !path.is_empty() {
        path.push(' ');
    }
    path.push_str(sub);
}

fn fmt_num(v: f64) -> String {
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let mut buf = ryu::Buffer::new();
    let s = buf.format(v);
    s.strip_suffix(".0").unwrap_or(s).to_string()
}
