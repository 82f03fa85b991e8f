//! Input stages: sample decoding and line calibration

use std::fs;
use tracing::{info, warn};

use super::{Capability, PipelineContext, PipelineError, Stage};
use crate::font_source::sample::{apply_aliases, apply_choices, decode_directory};
use crate::font_source::LineStatsTable;

/// Reads every sample identifier in the input directory. Any malformed
/// identifier aborts the run.
pub struct DecodeStage;

impl Stage for DecodeStage {
    fn name(&self) -> &'static str {
        "decode"
    }

    fn requires(&self) -> &'static [Capability] {
        &[]
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::Samples]
    }

    fn run(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        fs::metadata(&context.input_dir).map_err(|source| PipelineError::Io {
            path: context.input_dir.clone(),
            source,
        })?;

        let mut samples = decode_directory(&context.input_dir)?;
        let decoded = samples.len();
        apply_aliases(&mut samples, &context.config.samples.aliases);
        apply_choices(&mut samples, &context.config.samples.choices);
        info!(
            "Decoded {} samples ({} after aliases and choices)",
            decoded,
            samples.len()
        );
        context.samples = samples;
        Ok(())
    }
}

/// Per-line baseline and cap height from the reference samples.
pub struct LineStatisticsStage;

impl Stage for LineStatisticsStage {
    fn name(&self) -> &'static str {
        "line-statistics"
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Samples]
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::LineStatistics]
    }

    fn run(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let table = LineStatsTable::aggregate(&context.samples, &context.config.references);
        for line in table.missing_lines() {
            warn!("Line {line} lacks baseline or cap-height reference samples");
        }
        for (line, stats) in table.iter() {
            info!(
                "Line {line}: baseline {:.1}, cap height {:.1}, span {:.1}",
                stats.baseline,
                stats.cap_height,
                stats.cap_height - stats.baseline
            );
        }
        context.report.lines_without_statistics = table.missing_lines().collect();
        context.line_stats = table;
        Ok(())
    }
}
