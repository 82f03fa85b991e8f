//! Font source data: the scanned samples and what is measured from them
//!
//! This module covers everything known before any outline is touched: sample
//! identifiers, glyph naming, per-line calibration and the target metrics.

pub mod glyph_names;
pub mod line_stats;
pub mod metrics;
pub mod sample;

pub use line_stats::{LineStatistics, LineStatsTable};
pub use metrics::{FontInfo, FontMetrics};
pub use sample::{DecodeError, PixelBox, Sample, SampleKind};
