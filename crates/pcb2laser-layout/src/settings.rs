use std::path::Path;

use pcb2laser_copper::{JunctionSettings, SIMPLIFY_TOLERANCE};
use pcb2laser_geometry::KernelOptions;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Conversion options. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub kernel: KernelOptions,
    /// Sliver tolerance applied after every derived-layer boolean.
    pub simplify_tolerance: f64,
    pub junctions: JunctionSettings,
    pub copper_fill_margin: Option<f64>,
    pub copper_cut_fill_margin: Option<f64>,
    pub trace_clearance_margin: Option<f64>,
    pub oxidation_cleaning: bool,
    pub soldermask_cure: bool,
    pub svg_preview: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kernel: KernelOptions::default(),
            simplify_tolerance: SIMPLIFY_TOLERANCE,
            junctions: JunctionSettings::default(),
            copper_fill_margin: None,
            copper_cut_fill_margin: None,
            trace_clearance_margin: None,
            oxidation_cleaning: false,
            soldermask_cure: false,
            svg_preview: false,
        }
    }
}

impl Settings {
    /// Parse YAML (or JSON, which YAML accepts).
    pub fn from_yaml_str(s: &str) -> Result<Settings, LayoutError> {
        if s.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Settings, LayoutError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Clearance margin, when a positive one is configured.
    #[must_use]
    pub fn clearance_margin(&self) -> Option<f64> {
        self.trace_clearance_margin.filter(|m| *m > 0.0)
    }
}
