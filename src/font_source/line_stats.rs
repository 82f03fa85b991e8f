//! Per-line baseline and cap-height calibration
//!
//! Handwriting drifts from line to line on a scanned sheet, so every text
//! line gets its own baseline (mean bottom edge of the baseline reference
//! glyphs) and cap height (mean top edge of the cap-height references).

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::ReferenceSets;
use crate::font_source::sample::Sample;

/// Calibration of one text line, in scan pixels (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStatistics {
    pub baseline: f64,
    pub cap_height: f64,
}

/// Statistics for every line that has both kinds of reference samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineStatsTable {
    lines: BTreeMap<i32, LineStatistics>,
    missing: BTreeSet<i32>,
}

#[derive(Default)]
struct Accumulator {
    baseline_sum: i64,
    baseline_count: i64,
    cap_sum: i64,
    cap_count: i64,
}

impl LineStatsTable {
    /// Aggregate over all samples. Sums are kept as integers so the means do
    /// not depend on sample order.
    pub fn aggregate(samples: &[Sample], references: &ReferenceSets) -> Self {
        let mut acc: BTreeMap<i32, Accumulator> = BTreeMap::new();
        for sample in samples {
            let entry = acc.entry(sample.line).or_default();
            let [c] = sample.codepoints.as_slice() else {
                continue;
            };
            if references.baseline.contains(c) {
                entry.baseline_sum += i64::from(sample.bbox.y1);
                entry.baseline_count += 1;
            }
            if references.cap_height.contains(c) {
                entry.cap_sum += i64::from(sample.bbox.y0);
                entry.cap_count += 1;
            }
        }

        let mut table = Self::default();
        for (line, a) in acc {
            if a.baseline_count == 0 || a.cap_count == 0 {
                table.missing.insert(line);
                continue;
            }
            table.lines.insert(
                line,
                LineStatistics {
                    baseline: a.baseline_sum as f64 / a.baseline_count as f64,
                    cap_height: a.cap_sum as f64 / a.cap_count as f64,
                },
            );
        }
        table
    }

    pub fn get(&self, line: i32) -> Option<&LineStatistics> {
        self.lines.get(&line)
    }

    /// Lines that carry samples but lack a baseline or cap-height reference.
    pub fn missing_lines(&self) -> impl Iterator<Item = i32> + '_ {
        self.missing.iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &LineStatistics)> {
        self.lines.iter().map(|(line, stats)| (*line, stats))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
