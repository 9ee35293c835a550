use std::fmt;

use indexmap::IndexMap;
use pcb2laser_geometry::Geometry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopperLayer {
    Top,
    Bottom,
}

impl CopperLayer {
    pub const ALL: [CopperLayer; 2] = [CopperLayer::Top, CopperLayer::Bottom];
}

impl fmt::Display for CopperLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopperLayer::Top => write!(f, "top"),
            CopperLayer::Bottom => write!(f, "bottom"),
        }
    }
}

/// Electrical net identifier as written in the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetId(String);

impl NetId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetId {
    fn from(s: &str) -> Self {
        NetId::new(s)
    }
}

pub type NetKey = (CopperLayer, NetId);

/// Copper geometry grouped by layer and net, in registration order.
#[derive(Debug, Clone, Default)]
pub struct NetRegistry {
    buckets: IndexMap<NetKey, Vec<Geometry>>,
}

impl NetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `geometry` to the bucket for `(layer, net)`, creating it when missing.
    pub fn register(&mut self, layer: CopperLayer, net: &NetId, geometry: Geometry) {
        self.buckets
            .entry((layer, net.clone()))
            .or_default()
            .push(geometry);
    }

    /// Make sure `net` has a bucket on every copper layer.
    pub fn ensure_net(&mut self, net: &NetId) {
        for layer in CopperLayer::ALL {
            self.buckets.entry((layer, net.clone())).or_default();
        }
    }

    /// Geometry registered for `(layer, net)`; empty for unknown keys.
    #[must_use]
    pub fn bucket(&self, layer: CopperLayer, net: &NetId) -> &[Geometry] {
        self.buckets
            .get(&(layer, net.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NetKey, &[Geometry])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
