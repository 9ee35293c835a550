//! Fixed table of laser layers.
//!
//! Indices are part of the output format and never change, whichever optional layers a
//! conversion enables.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Vector cut along the path.
    Cut,
    /// Raster fill of the enclosed area (non-zero rule).
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CutLayer {
    BoardOutline = 0,
    TopCopper = 1,
    BottomCopper = 2,
    TopCopperFill = 3,
    BottomCopperFill = 4,
    TopCopperCutFill = 5,
    BottomCopperCutFill = 6,
    TopTraceClearance = 7,
    BottomTraceClearance = 8,
    OxidationCleaning = 9,
    TopSoldermask = 10,
    BottomSoldermask = 11,
    TopSoldermaskCure = 12,
    BottomSoldermaskCure = 13,
    Drill = 14,
    Cutout = 15,
}

impl CutLayer {
    pub const ALL: [CutLayer; 16] = [
        CutLayer::BoardOutline,
        CutLayer::TopCopper,
        CutLayer::BottomCopper,
        CutLayer::TopCopperFill,
        CutLayer::BottomCopperFill,
        CutLayer::TopCopperCutFill,
        CutLayer::BottomCopperCutFill,
        CutLayer::TopTraceClearance,
        CutLayer::BottomTraceClearance,
        CutLayer::OxidationCleaning,
        CutLayer::TopSoldermask,
        CutLayer::BottomSoldermask,
        CutLayer::TopSoldermaskCure,
        CutLayer::BottomSoldermaskCure,
        CutLayer::Drill,
        CutLayer::Cutout,
    ];

    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_index(index: u8) -> Option<CutLayer> {
        Self::ALL.get(usize::from(index)).copied()
    }

    #[must_use]
    pub fn operation(self) -> Operation {
        match self {
            CutLayer::BoardOutline
            | CutLayer::TopCopperCutFill
            | CutLayer::BottomCopperCutFill
            | CutLayer::Drill
            | CutLayer::Cutout => Operation::Cut,
            _ => Operation::Fill,
        }
    }

    /// Whether one item may carry several contours (an outer plus its holes).
    #[must_use]
    pub fn supports_fill_groups(self) -> bool {
        self.operation() == Operation::Fill
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CutLayer::BoardOutline => "board_outline",
            CutLayer::TopCopper => "top_copper",
            CutLayer::BottomCopper => "bottom_copper",
            CutLayer::TopCopperFill => "top_copper_fill",
            CutLayer::BottomCopperFill => "bottom_copper_fill",
            CutLayer::TopCopperCutFill => "top_copper_cut_fill",
            CutLayer::BottomCopperCutFill => "bottom_copper_cut_fill",
            CutLayer::TopTraceClearance => "top_trace_clearance",
            CutLayer::BottomTraceClearance => "bottom_trace_clearance",
            CutLayer::OxidationCleaning => "oxidation_cleaning",
            CutLayer::TopSoldermask => "top_soldermask",
            CutLayer::BottomSoldermask => "bottom_soldermask",
            CutLayer::TopSoldermaskCure => "top_soldermask_cure",
            CutLayer::BottomSoldermaskCure => "bottom_soldermask_cure",
            CutLayer::Drill => "drill",
            CutLayer::Cutout => "cutout",
        }
    }

    /// Preview colour.
    #[must_use]
    pub fn color(self) -> &'static str {
        const PALETTE: [&str; 16] = [
            "#000000", "#c83737", "#3771c8", "#e9a0a0", "#a0bde9", "#782121", "#1f3f78", "#ffb380",
            "#80b3ff", "#7f7f7f", "#37c871", "#2ca05a", "#afe9c6", "#87deaa", "#ff00ff", "#d45500",
        ];
        PALETTE[usize::from(self.index())]
    }
}

impl fmt::Display for CutLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<CutLayer> for u8 {
    fn from(layer: CutLayer) -> u8 {
        layer.index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer index {0}")]
pub struct UnknownLayer(pub u8);

impl TryFrom<u8> for CutLayer {
    type Error = UnknownLayer;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        CutLayer::from_index(index).ok_or(UnknownLayer(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_table_position() {
        for (i, layer) in CutLayer::ALL.iter().enumerate() {
            assert_eq!(usize::from(layer.index()), i);
            assert_eq!(CutLayer::from_index(layer.index()), Some(*layer));
        }
        assert_eq!(CutLayer::from_index(16), None);
    }

    #[test]
    fn fixed_indices_are_stable() {
        assert_eq!(CutLayer::BoardOutline.index(), 0);
        assert_eq!(CutLayer::TopCopper.index(), 1);
        assert_eq!(CutLayer::OxidationCleaning.index(), 9);
        assert_eq!(CutLayer::Cutout.index(), 15);
    }

    #[test]
    fn cut_layers_do_not_group() {
        assert_eq!(CutLayer::Drill.operation(), Operation::Cut);
        assert!(!CutLayer::BoardOutline.supports_fill_groups());
        assert!(CutLayer::TopCopperFill.supports_fill_groups());
    }

    #[test]
    fn serializes_as_index() {
        let json = serde_json::to_string(&CutLayer::BottomSoldermaskCure).unwrap();
        assert_eq!(json, "13");
        let back: CutLayer = serde_json::from_str("7").unwrap();
        assert_eq!(back, CutLayer::TopTraceClearance);
        assert!(serde_json::from_str::<CutLayer>("42").is_err());
    }
}
