//! Layout input document.

use std::path::Path;

use pcb2laser_copper::{CopperLayer, NetId};
use pcb2laser_geometry::{Contour, Point};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::settings::Settings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub board: Option<Board>,
    /// Nets of the connectivity model; element nets are added on top.
    pub nets: Vec<NetId>,
    pub pads: Vec<Pad>,
    pub traces: Vec<Trace>,
    pub vias: Vec<Via>,
    pub holes: Vec<Hole>,
    pub cutouts: Vec<Cutout>,
    pub settings: Option<Settings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub outline: Vec<Point>,
}

impl Board {
    /// Outline as a positive contour.
    pub fn contour(&self) -> Result<Contour, LayoutError> {
        if self.outline.len() < 3 {
            return Err(LayoutError::BoardOutlineTooShort {
                found: self.outline.len(),
            });
        }
        let c = Contour::new(self.outline.clone()).dedup(pcb2laser_geometry::contour::DEDUP_EPS);
        c.validate().map_err(LayoutError::BoardOutlineInvalid)?;
        Ok(c.with_winding(pcb2laser_geometry::Winding::Positive))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadLayer {
    #[default]
    Top,
    Bottom,
    Both,
}

impl PadLayer {
    #[must_use]
    pub fn copper_layers(self) -> &'static [CopperLayer] {
        match self {
            PadLayer::Top => &[CopperLayer::Top],
            PadLayer::Bottom => &[CopperLayer::Bottom],
            PadLayer::Both => &CopperLayer::ALL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PadShape {
    Rect { size: [f64; 2] },
    Circle { diameter: f64 },
    RoundedRect { size: [f64; 2], radius: f64 },
    Pill { size: [f64; 2] },
    Oval { size: [f64; 2] },
    Polygon { points: Vec<Point> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub at: Point,
    #[serde(flatten)]
    pub shape: PadShape,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub layer: PadLayer,
    #[serde(default)]
    pub net: Option<NetId>,
    #[serde(default)]
    pub soldermask: Option<SoldermaskOpening>,
}

/// Soldermask opening over a pad, grown by `margin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoldermaskOpening {
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default = "default_trace_layer")]
    pub layer: CopperLayer,
    #[serde(default)]
    pub net: Option<NetId>,
    pub width: f64,
    pub points: Vec<Point>,
}

fn default_trace_layer() -> CopperLayer {
    CopperLayer::Top
}

/// Plated via: copper disc on both layers plus a drill hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub at: Point,
    pub diameter: f64,
    pub drill: f64,
    #[serde(default)]
    pub net: Option<NetId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub at: Point,
    pub diameter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutout {
    pub points: Vec<Point>,
}

impl Layout {
    pub fn from_yaml_str(s: &str) -> Result<Layout, LayoutError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Layout, LayoutError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Every net the layout mentions: declared nets first, then element nets in document order.
    #[must_use]
    pub fn all_nets(&self) -> Vec<NetId> {
        let mut out: Vec<NetId> = Vec::new();
        let element_nets = self
            .pads
            .iter()
            .filter_map(|p| p.net.as_ref())
            .chain(self.vias.iter().filter_map(|v| v.net.as_ref()))
            .chain(self.traces.iter().filter_map(|t| t.net.as_ref()));
        for net in self.nets.iter().chain(element_nets) {
            if !out.contains(net) {
                out.push(net.clone());
            }
        }
        out
    }
}
