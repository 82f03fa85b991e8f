//! Outline geometry
//!
//! Everything the pipeline does to glyph shapes goes through the [`Outline`]
//! type and the [`OutlineEngine`] seam. Pure affine and clean-up operations
//! live on `Outline`; the engine adds what needs a real geometry backend
//! (file import, booleans, stroke expansion).

pub mod boolean;
pub mod engine;
pub mod ops;
pub mod outline;
pub mod svg;

use std::path::PathBuf;
use thiserror::Error;

pub use engine::{KurboEngine, OutlineEngine};
pub use ops::OutlineOp;
pub use outline::{ContourSplit, Outline};

/// Tolerance used when flattening curves for booleans and probing.
pub const FLATTEN_TOLERANCE: f64 = 0.25;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("failed to read outline file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("outline file {path:?} is not valid SVG: {message}")]
    Svg { path: PathBuf, message: String },
    #[error("outline file {path:?} contains no contours")]
    NoContours { path: PathBuf },
    #[error("no outline registered for {path:?}")]
    Unregistered { path: PathBuf },
    #[error("{operation} on an empty outline")]
    EmptyOperand { operation: &'static str },
    #[error("{operation} produced an empty outline")]
    EmptyResult { operation: &'static str },
}
