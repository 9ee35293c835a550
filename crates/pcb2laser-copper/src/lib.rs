//! Net-aware copper synthesis: per-net registry, island merging and derived layers.

pub mod clearance;
pub mod derived;
pub mod junction;
pub mod merge;
pub mod registry;

pub use clearance::{ClearanceBand, ClearanceRegistry};
pub use derived::{DerivedLayer, DerivedOutcome, SIMPLIFY_TOLERANCE, Synthesizer};
pub use junction::{JunctionSettings, ViaSite, junction_circles};
pub use merge::{Island, MergeStatus, MergedNet, NetMerger};
pub use registry::{CopperLayer, NetId, NetKey, NetRegistry};
