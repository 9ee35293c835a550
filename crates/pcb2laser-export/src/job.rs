use std::path::{Path, PathBuf};

use pcb2laser_geometry::Contour;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::emit::JobItem;
use crate::layers::CutLayer;

/// Job document format revision.
pub const JOB_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize job: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered list of laser items. Items are never modified once pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserJob {
    pub version: u32,
    items: Vec<JobItem>,
}

impl Default for LaserJob {
    fn default() -> Self {
        Self {
            version: JOB_VERSION,
            items: Vec::new(),
        }
    }
}

impl LaserJob {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: JobItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = JobItem>) {
        self.items.extend(items);
    }

    #[must_use]
    pub fn items(&self) -> &[JobItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items_on(&self, layer: CutLayer) -> impl Iterator<Item = &JobItem> {
        self.items.iter().filter(move |i| i.layer() == layer)
    }

    /// Every closed contour emitted so far on `layer`.
    #[must_use]
    pub fn contours_on(&self, layer: CutLayer) -> Vec<Contour> {
        self.items_on(layer).flat_map(JobItem::contours).collect()
    }

    /// Layers with at least one item, in table order.
    #[must_use]
    pub fn layers_used(&self) -> Vec<CutLayer> {
        CutLayer::ALL
            .into_iter()
            .filter(|l| self.items_on(*l).next().is_some())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<LaserJob, ExportError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), items = self.items.len(), "wrote job");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{CutPath, emit_shape};
    use pcb2laser_geometry::{Point, Rect, Shape};

    fn square(cx: f64) -> Contour {
        Rect::centered(Point::new(cx, 0.0), 1.0, 1.0).to_contour()
    }

    #[test]
    fn contours_on_filters_by_layer_and_flattens_groups() {
        let mut job = LaserJob::new();
        job.push(JobItem::Path(CutPath::from_contour(CutLayer::BoardOutline, &square(0.0))));
        job.extend(emit_shape(
            CutLayer::TopSoldermask,
            &Shape::new(square(5.0), vec![]),
        ));
        job.extend(emit_shape(
            CutLayer::TopSoldermask,
            &Shape::new(square(8.0), vec![]),
        ));
        assert_eq!(job.contours_on(CutLayer::TopSoldermask), vec![square(5.0), square(8.0)]);
        assert_eq!(job.contours_on(CutLayer::BoardOutline).len(), 1);
        assert!(job.contours_on(CutLayer::Drill).is_empty());
        assert_eq!(
            job.layers_used(),
            vec![CutLayer::BoardOutline, CutLayer::TopSoldermask]
        );
    }

    #[test]
    fn json_round_trip_keeps_items() {
        let mut job = LaserJob::new();
        job.extend(emit_shape(
            CutLayer::TopCopper,
            &Shape::new(square(0.0), vec![]),
        ));
        let json = job.to_json().unwrap();
        assert!(json.contains("\"type\": \"fill_group\""));
        assert!(json.contains("\"layer\": 1"));
        let back = LaserJob::from_json(&json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn write_json_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        LaserJob::new().write_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"version\": 1"));
    }

    #[test]
    fn write_json_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("job.json");
        let err = LaserJob::new().write_json(&path).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
