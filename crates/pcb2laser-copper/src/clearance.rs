use indexmap::IndexMap;
use pcb2laser_geometry::{Contour, Point, TraceError, trace_outline};

use crate::registry::{CopperLayer, NetId, NetKey};

/// Trace outlines at their own width and widened by the clearance margin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClearanceBand {
    pub inner: Vec<Contour>,
    pub outer: Vec<Contour>,
}

/// Per-net trace outlines kept aside, unmerged, for the trace clearance layer.
#[derive(Debug, Clone, Default)]
pub struct ClearanceRegistry {
    bands: IndexMap<NetKey, ClearanceBand>,
}

impl ClearanceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trace. The outer outline is rebuilt at `width + 2 * margin`.
    pub fn add_trace(
        &mut self,
        layer: CopperLayer,
        net: &NetId,
        centerline: &[Point],
        width: f64,
        margin: f64,
    ) -> Result<(), TraceError> {
        let inner = trace_outline(centerline, width)?;
        let outer = trace_outline(centerline, width + 2.0 * margin)?;
        let band = self.bands.entry((layer, net.clone())).or_default();
        band.inner.push(inner);
        band.outer.push(outer);
        Ok(())
    }

    /// Bands on `layer`, in registration order.
    pub fn on_layer(&self, layer: CopperLayer) -> impl Iterator<Item = (&NetId, &ClearanceBand)> {
        self.bands
            .iter()
            .filter(move |((l, _), _)| *l == layer)
            .map(|((_, net), band)| (net, band))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}
