//! Geometry normalization: raw scans into the shared design space
//!
//! Fixed order per glyph: scale, translate and space, line weight and the
//! special-case overrides, then simplify and snap. Samples are independent,
//! so they are processed in parallel and inserted in sample order.

use rayon::prelude::*;
use tracing::{debug, info};

use super::repository::{Glyph, GlyphOrigin};
use super::{Capability, PipelineContext, PipelineError, Stage};
use crate::config::PipelineConfig;
use crate::font_source::glyph_names::glyph_name;
use crate::font_source::{FontMetrics, LineStatistics, LineStatsTable, Sample, SampleKind};
use crate::geometry::{ops, GeometryError, Outline, OutlineEngine, OutlineOp};

pub struct NormalizeStage;

impl Stage for NormalizeStage {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Samples, Capability::LineStatistics]
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::NormalizedGlyphs]
    }

    fn run(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let config = &context.config;
        let stats = &context.line_stats;
        let engine = context.engine.as_ref();
        let results: Vec<Result<Glyph, PipelineError>> = context
            .samples
            .par_iter()
            .map(|sample| normalize_sample(sample, stats, config, engine))
            .collect();

        let mut normalized = 0;
        for result in results {
            match result {
                Ok(glyph) => {
                    normalized += 1;
                    if let Some(previous) = context.repository.insert(glyph) {
                        debug!(
                            "{} from {} replaced by a later sample",
                            previous.name, previous.provenance
                        );
                    }
                }
                Err(error) => context.report.record(error),
            }
        }

        context.repository.insert(space_glyph(config));
        info!("Normalized {normalized} of {} samples", context.samples.len());
        Ok(())
    }
}

/// The word space: an advance and nothing else.
pub fn space_glyph(config: &PipelineConfig) -> Glyph {
    Glyph::new(glyph_name(' '), Outline::default(), config.space_width, GlyphOrigin::Space)
        .with_codepoints(vec![' '])
}

/// Ink span, in scan pixels, of a glyph that fills the EM on this line.
pub fn full_glyph_size(stats: &LineStatistics, metrics: &FontMetrics) -> f64 {
    -(stats.cap_height - stats.baseline) / metrics.top_ratio()
}

/// Uniform scale from imported outline units to design units.
pub fn scale_factor(
    imported_height: f64,
    sample: &Sample,
    stats: &LineStatistics,
    metrics: &FontMetrics,
) -> f64 {
    (metrics.em() / imported_height) * (sample.bbox.height() / full_glyph_size(stats, metrics))
}

pub fn normalize_sample(
    sample: &Sample,
    stats: &LineStatsTable,
    config: &PipelineConfig,
    engine: &dyn OutlineEngine,
) -> Result<Glyph, PipelineError> {
    let name = sample.glyph_name();
    let line_stats = stats
        .get(sample.line)
        .ok_or_else(|| PipelineError::MissingStatistics {
            glyph: name.clone(),
            line: sample.line,
        })?;

    let mut outline = engine
        .load(&sample.outline_ref)
        .map_err(|e| PipelineError::geometry(&name, e))?;
    let mut advance = place(&mut outline, sample, line_stats, config, &name)
        .map_err(|e| PipelineError::geometry(&name, e))?;

    let text = sample.text();
    let weights = config
        .line_weights
        .iter()
        .filter(|w| w.line == sample.line)
        .map(|w| OutlineOp::Weight { width: w.width });
    let overrides = config
        .overrides
        .iter()
        .filter(|o| o.codepoints == text)
        .flat_map(|o| o.ops.iter().cloned());
    let edits: Vec<OutlineOp> = weights.chain(overrides).collect();
    ops::apply_all(&edits, &mut outline, &mut advance, engine)
        .map_err(|e| PipelineError::geometry(&name, e))?;

    outline.finalize(config.finalize.tolerance, config.finalize.passes);
    let advance = advance.round();

    let (codepoints, origin) = match sample.kind() {
        SampleKind::Single(c) => (vec![c], GlyphOrigin::Sample { line: sample.line }),
        SampleKind::Variant { base, suffix } => (
            Vec::new(),
            GlyphOrigin::Variant {
                base: glyph_name(base),
                suffix,
            },
        ),
        SampleKind::Ligature => (
            Vec::new(),
            GlyphOrigin::Ligature {
                components: sample.codepoints.iter().map(|c| glyph_name(*c)).collect(),
            },
        ),
    };

    let provenance = sample
        .outline_ref
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Glyph::new(name, outline, advance, origin)
        .with_codepoints(codepoints)
        .with_provenance(provenance))
}

/// Scale and position the imported outline; returns the advance width.
fn place(
    outline: &mut Outline,
    sample: &Sample,
    stats: &LineStatistics,
    config: &PipelineConfig,
    name: &str,
) -> Result<f64, GeometryError> {
    let metrics = &config.font.metrics;
    let imported = outline.bounding_box().ok_or(GeometryError::EmptyOperand {
        operation: "normalize",
    })?;
    if imported.height() <= 0.0 {
        return Err(GeometryError::EmptyOperand {
            operation: "normalize",
        });
    }

    let factor = scale_factor(imported.height(), sample, stats, metrics);
    outline.scale(factor, factor);

    let scaled = outline.bounding_box().ok_or(GeometryError::EmptyResult {
        operation: "normalize",
    })?;
    let lift = (stats.baseline - f64::from(sample.bbox.y1)) * metrics.em()
        / full_glyph_size(stats, metrics);
    outline.translate(-scaled.x0, -scaled.y0 + lift);

    let pad = config.spacing.side_padding;
    let advance = scaled.width() + config.width_pads(name) * pad;
    outline.translate(config.shift_pads(name) * pad, 0.0);
    Ok(advance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceSets;
    use crate::font_source::PixelBox;
    use crate::geometry::engine::memory::MemoryEngine;
    use kurbo::BezPath;
    use std::path::PathBuf;

    fn rect(w: f64, h: f64) -> Outline {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((w, 0.0));
        p.line_to((w, h));
        p.line_to((0.0, h));
        p.close_path();
        Outline::new(vec![p])
    }

    fn sample(text: &str, file: &str, y0: i32, y1: i32) -> Sample {
        Sample {
            line: 0,
            position: Some(0),
            bbox: PixelBox {
                x0: 0,
                y0,
                x1: 100,
                y1,
            },
            codepoints: text.chars().collect(),
            outline_ref: PathBuf::from(file),
        }
    }

    fn calibration() -> Vec<Sample> {
        vec![
            sample("A", "A.svg", 900, 1200),
            sample("S", "S.svg", 305, 700),
        ]
    }

    #[test]
    fn ink_height_does_not_depend_on_import_resolution() {
        let mut config = PipelineConfig::default();
        config.line_weights.clear();
        let stats = LineStatsTable::aggregate(&calibration(), &ReferenceSets::default());
        let mut engine = MemoryEngine::default();
        engine.insert("small.svg", rect(40.0, 50.0));
        engine.insert("large.svg", rect(400.0, 500.0));

        let small = normalize_sample(&sample("x", "small.svg", 1000, 1200), &stats, &config, &engine)
            .expect("small sample");
        let large = normalize_sample(&sample("x", "large.svg", 1000, 1200), &stats, &config, &engine)
            .expect("large sample");
        let h_small = small.bounding_box().expect("ink").height();
        let h_large = large.bounding_box().expect("ink").height();
        assert!((h_small - h_large).abs() <= 1.0, "{h_small} vs {h_large}");

        let stats0 = stats.get(0).expect("line 0");
        let expected = config.font.metrics.em() * 200.0 / full_glyph_size(stats0, &config.font.metrics);
        assert!((h_small - expected).abs() <= 1.0);
    }

    #[test]
    fn glyph_sits_on_the_baseline_with_padding() {
        let mut config = PipelineConfig::default();
        config.line_weights.clear();
        let stats = LineStatsTable::aggregate(&calibration(), &ReferenceSets::default());
        let mut engine = MemoryEngine::default();
        engine.insert("A.svg", rect(300.0, 300.0));

        let glyph = normalize_sample(&calibration()[0], &stats, &config, &engine).expect("A");
        let bbox = glyph.bounding_box().expect("ink");
        assert_eq!(bbox.y0, 0.0);
        assert_eq!(bbox.x0, 20.0);
        assert!((glyph.advance_width - (bbox.width() + 40.0)).abs() <= 1.0);
        assert_eq!(glyph.codepoints, vec!['A']);
    }

    #[test]
    fn descenders_drop_below_the_baseline() {
        let mut config = PipelineConfig::default();
        config.line_weights.clear();
        let stats = LineStatsTable::aggregate(&calibration(), &ReferenceSets::default());
        let mut engine = MemoryEngine::default();
        engine.insert("g.svg", rect(100.0, 100.0));

        let glyph = normalize_sample(&sample("g", "g.svg", 1000, 1300), &stats, &config, &engine)
            .expect("g");
        let bbox = glyph.bounding_box().expect("ink");
        assert!(bbox.y0 < -50.0, "descender at {}", bbox.y0);
        // g shifts three paddings left
        assert_eq!(bbox.x0, -60.0);
    }

    #[test]
    fn lines_without_statistics_are_reported() {
        let config = PipelineConfig::default();
        let stats = LineStatsTable::aggregate(&calibration(), &ReferenceSets::default());
        let engine = MemoryEngine::default();
        let mut orphan = sample("x", "x.svg", 0, 10);
        orphan.line = 9;
        let err = normalize_sample(&orphan, &stats, &config, &engine).expect_err("no stats");
        assert!(matches!(err, PipelineError::MissingStatistics { line: 9, .. }));
    }

    #[test]
    fn ligature_and_variant_samples_are_unencoded() {
        let mut config = PipelineConfig::default();
        config.line_weights.clear();
        let stats = LineStatsTable::aggregate(&calibration(), &ReferenceSets::default());
        let mut engine = MemoryEngine::default();
        engine.insert("TT.svg", rect(200.0, 100.0));
        engine.insert("Uss01.svg", rect(100.0, 100.0));

        let lig = normalize_sample(&sample("TT", "TT.svg", 900, 1200), &stats, &config, &engine)
            .expect("ligature");
        assert_eq!(lig.name, "T_T");
        assert!(lig.codepoints.is_empty());
        assert_eq!(
            lig.origin,
            GlyphOrigin::Ligature {
                components: vec!["T".into(), "T".into()]
            }
        );

        let variant =
            normalize_sample(&sample("U.ss01", "Uss01.svg", 900, 1200), &stats, &config, &engine)
                .expect("variant");
        assert_eq!(variant.name, "U.ss01");
        assert!(matches!(variant.origin, GlyphOrigin::Variant { ref suffix, .. } if suffix == "ss01"));
    }
}
