//! Structured summary of a pipeline run

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::PipelineError;

/// Why a glyph is missing or degraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    MissingStatistics { line: i32 },
    MissingConstituent { missing: Vec<String> },
    Geometry { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub failures: BTreeMap<String, FailureReason>,
    pub lines_without_statistics: Vec<i32>,
    pub sample_count: usize,
    pub glyph_count: usize,
    pub substitution_count: usize,
    pub kerning_pair_count: usize,
    /// Sweep targets left out because a base or mark glyph is absent.
    pub skipped_accents: usize,
}

impl RunReport {
    /// Record a non-fatal failure against the glyph it affected.
    pub fn record(&mut self, error: PipelineError) {
        let (glyph, reason) = match error {
            PipelineError::MissingStatistics { glyph, line } => {
                warn!("Skipping {glyph}: line {line} has no statistics");
                (glyph, FailureReason::MissingStatistics { line })
            }
            PipelineError::MissingConstituent { glyph, missing } => {
                debug!("Skipping {glyph}: missing {}", missing.join(", "));
                (glyph, FailureReason::MissingConstituent { missing })
            }
            PipelineError::Geometry { glyph, source } => {
                warn!("Skipping {glyph}: {source}");
                (
                    glyph,
                    FailureReason::Geometry {
                        message: source.to_string(),
                    },
                )
            }
            other => {
                warn!("Unexpected failure recorded in run report: {other}");
                return;
            }
        };
        self.failures.insert(glyph, reason);
    }

    /// No glyph was lost to missing line statistics. Decode errors never get
    /// this far: they abort the run.
    pub fn is_clean_success(&self) -> bool {
        self.lines_without_statistics.is_empty()
            && !self
                .failures
                .values()
                .any(|r| matches!(r, FailureReason::MissingStatistics { .. }))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct Document<'a> {
            clean_success: bool,
            #[serde(flatten)]
            report: &'a RunReport,
        }

        let document = Document {
            clean_success: self.is_clean_success(),
            report: self,
        };
        fs::write(path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write run report {}", path.display()))?;
        debug!("Wrote run report to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;

    #[test]
    fn missing_constituents_keep_the_run_clean() {
        let mut report = RunReport::default();
        report.record(PipelineError::MissingConstituent {
            glyph: "Agrave".into(),
            missing: vec!["A".into()],
        });
        report.record(PipelineError::Geometry {
            glyph: "cedilla".into(),
            source: GeometryError::EmptyResult {
                operation: "exclude",
            },
        });
        assert!(report.is_clean_success());
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn missing_statistics_are_not_clean() {
        let mut report = RunReport::default();
        report.record(PipelineError::MissingStatistics {
            glyph: "A".into(),
            line: 7,
        });
        assert!(!report.is_clean_success());
        assert_eq!(
            report.failures.get("A"),
            Some(&FailureReason::MissingStatistics { line: 7 })
        );
    }

    #[test]
    fn saved_report_carries_the_clean_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        RunReport::default().save(&path).expect("save report");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(value["clean_success"], serde_json::Value::Bool(true));
    }
}
