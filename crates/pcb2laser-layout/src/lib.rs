//! Layout documents and the conversion pipeline that turns them into laser jobs.

pub mod convert;
pub mod elements;
pub mod error;
pub mod model;
pub mod settings;

pub use convert::{Conversion, ConversionReport, convert, copper_layer, soldermask_layer};
pub use error::{ElementError, LayoutError};
pub use model::{Board, Cutout, Hole, Layout, Pad, PadLayer, PadShape, SoldermaskOpening, Trace, Via};
pub use settings::Settings;
