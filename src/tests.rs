//! Whole-pipeline scenarios over temporary sample directories

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use kurbo::BezPath;
use tempfile::TempDir;

use crate::config::PipelineConfig;
use crate::geometry::engine::memory::MemoryEngine;
use crate::geometry::Outline;
use crate::pipeline::compose::accent;
use crate::pipeline::repository::{AnchorClass, AnchorRole};
use crate::pipeline::{FailureReason, Pipeline, PipelineContext, PipelineError, ScheduleError};

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((x0, y0));
    p.line_to((x1, y0));
    p.line_to((x1, y1));
    p.line_to((x0, y1));
    p.close_path();
    p
}

/// A sample directory on disk with its outlines served from memory.
struct Scans {
    dir: TempDir,
    engine: MemoryEngine,
    next_position: i32,
}

impl Scans {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            engine: MemoryEngine::default(),
            next_position: 0,
        }
    }

    /// Register `text` written on `line` inside the pixel box, drawn as
    /// `contours` in imported units.
    fn write(&mut self, line: i32, text: &str, bbox: (i32, i32, i32, i32), contours: Vec<BezPath>) {
        let (x0, y0, x1, y1) = bbox;
        let file = format!(
            "char_L{line}_P{}_x{x0}_y{y0}_x{x1}_y{y1}_{}.svg",
            self.next_position,
            STANDARD.encode(text)
        );
        self.next_position += 1;
        let path = self.dir.path().join(file);
        std::fs::write(&path, "<svg/>").expect("sample file");
        self.engine.insert(path, Outline::new(contours));
    }

    /// A solid block as tall as its pixel box.
    fn block(&mut self, line: i32, text: &str, bbox: (i32, i32, i32, i32)) {
        let (x0, y0, x1, y1) = bbox;
        let outline = rect(0.0, 0.0, f64::from(x1 - x0), f64::from(y1 - y0));
        self.write(line, text, bbox, vec![outline]);
    }

    fn run(self) -> (Result<(), PipelineError>, PipelineContext, TempDir) {
        let mut context = PipelineContext::new(
            PipelineConfig::default(),
            Box::new(self.engine),
            self.dir.path(),
        );
        let result = Pipeline::standard().run(&mut context);
        (result, context, self.dir)
    }
}

/// One line with baseline references A, E, M and cap-height references S, T.
fn calibrated_line() -> Scans {
    let mut scans = Scans::new();
    scans.block(0, "A", (0, 305, 300, 1200));
    scans.block(0, "E", (320, 305, 600, 1210));
    scans.block(0, "M", (620, 300, 970, 1190));
    scans.block(0, "S", (990, 300, 1200, 1200));
    scans.block(0, "T", (1220, 310, 1420, 1205));
    scans
}

/// An O whose grave floats above the 540 cut once normalized.
fn add_ograve(scans: &mut Scans) {
    scans.write(
        0,
        "\u{D2}",
        (1440, 250, 1740, 1200),
        vec![rect(0.0, 0.0, 300.0, 780.0), rect(100.0, 860.0, 200.0, 950.0)],
    );
}

#[test]
fn calibrated_line_builds_a_clean_font() {
    let (result, context, _dir) = calibrated_line().run();
    result.expect("pipeline run");

    let stats = context.line_stats.get(0).expect("line 0 statistics");
    assert_eq!(stats.baseline, 1200.0);
    assert_eq!(stats.cap_height, 305.0);

    let repo = &context.repository;
    let a = repo.get("A").expect("A");
    let e = repo.get("E").expect("E");
    let ae = repo.get("AE").expect("AE digraph");
    assert_eq!(ae.advance_width, a.advance_width + e.advance_width - 120.0);
    assert_eq!(ae.outline.contours().len(), 2);
    assert!(a.anchor(AnchorClass::Top, AnchorRole::Base).is_some());

    assert!(context.report.is_clean_success());
    assert_eq!(context.report.sample_count, 5);
    assert_eq!(context.report.glyph_count, repo.len());
}

#[test]
fn carved_grave_lands_exactly_on_the_letter() {
    let mut scans = calibrated_line();
    add_ograve(&mut scans);
    let (result, context, _dir) = scans.run();
    result.expect("pipeline run");

    let repo = &context.repository;
    let a = repo.get("A").expect("A");
    let grave = repo.get("gravecomb").expect("carved gravecomb");
    assert_eq!(grave.advance_width, 0.0);
    let agrave = repo.get("Agrave").expect("swept Agrave");
    assert_eq!(agrave.codepoints, vec!['\u{C0}']);
    assert_eq!(
        agrave.outline.contours().len(),
        a.outline.contours().len() + grave.outline.contours().len()
    );

    let composed = accent::compose("Agrave", a, grave);
    let target = a.anchor(AnchorClass::Top, AnchorRole::Base).expect("A top");
    let mark = grave.anchor(AnchorClass::Top, AnchorRole::Mark).expect("_top");
    assert_eq!(mark + composed.mark_offset, target);
    assert_eq!(composed.attachment, Some(AnchorClass::Top));
}

#[test]
fn sweep_targets_over_absent_bases_are_skipped_quietly() {
    let mut scans = calibrated_line();
    add_ograve(&mut scans);
    let (result, context, _dir) = scans.run();
    result.expect("pipeline run");

    assert!(!context.repository.contains("Ugrave"));
    assert!(!context.report.failures.contains_key("Ugrave"));
    assert!(context.report.skipped_accents > 0);
    assert!(context.report.is_clean_success());
}

#[test]
fn recipe_jobs_over_absent_glyphs_are_reported() {
    let (result, context, _dir) = calibrated_line().run();
    result.expect("pipeline run");

    // no scanned Ograve, so nothing to carve the grave from
    assert_eq!(
        context.report.failures.get("gravecomb"),
        Some(&FailureReason::MissingConstituent {
            missing: vec!["Ograve".to_string()]
        })
    );
    assert!(context.report.is_clean_success());
}

#[test]
fn malformed_identifier_aborts_the_run() {
    let scans = calibrated_line();
    std::fs::write(scans.dir.path().join("char_L0_P9_oops.svg"), "<svg/>").expect("file");
    let (result, context, _dir) = scans.run();
    assert!(matches!(result, Err(PipelineError::Decode(_))));
    assert!(context.repository.is_empty());
}

#[test]
fn line_without_references_is_not_fatal() {
    let mut scans = calibrated_line();
    scans.block(3, "x", (0, 600, 200, 900));
    let (result, context, _dir) = scans.run();
    result.expect("pipeline run");

    assert!(!context.repository.contains("x"));
    assert!(context.repository.contains("A"));
    assert_eq!(
        context.report.failures.get("x"),
        Some(&FailureReason::MissingStatistics { line: 3 })
    );
    assert_eq!(context.report.lines_without_statistics, vec![3]);
    assert!(!context.report.is_clean_success());
}

#[test]
fn unprovided_stage_inputs_fail_before_anything_runs() {
    let mut context = PipelineContext::new(
        PipelineConfig::default(),
        Box::new(MemoryEngine::default()),
        "missing-dir",
    );
    let pipeline = Pipeline::new(vec![Box::new(crate::pipeline::kerning::KerningStage)]);
    let result = pipeline.run(&mut context);
    assert!(matches!(
        result,
        Err(PipelineError::Schedule(ScheduleError::Unprovided { stage: "kerning", .. }))
    ));
}

#[test]
fn pipeline_output_round_trips_through_ufo() {
    let mut scans = calibrated_line();
    add_ograve(&mut scans);
    let (result, context, dir) = scans.run();
    result.expect("pipeline run");

    let ufo = dir.path().join("out").join("Handwriting.ufo");
    std::fs::create_dir_all(ufo.parent().expect("parent")).expect("out dir");
    crate::data::save_ufo(&context.repository, &context.config.font, &ufo).expect("save");

    let font = crate::data::ufo::load_ufo_from_path(&ufo).expect("load");
    let layer = font.default_layer();
    assert_eq!(layer.len(), context.repository.len());
    let agrave = layer.get_glyph("Agrave").expect("Agrave in UFO");
    assert_eq!(agrave.codepoints.iter().collect::<Vec<char>>(), vec!['\u{C0}']);
    let grave = layer.get_glyph("gravecomb").expect("gravecomb in UFO");
    assert!(grave
        .anchors
        .iter()
        .any(|a| a.name.as_ref().map(|n| n.as_str()) == Some("_top")));
    assert!(font.features.starts_with("languagesystem DFLT dflt;"));
}
