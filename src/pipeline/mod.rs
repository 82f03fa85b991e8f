//! The sample-to-font pipeline
//!
//! Stages declare which capabilities they need and which they provide;
//! [`Pipeline::schedule`] derives the run order from those declarations
//! instead of relying on the order the stages were listed in.

pub mod anchors;
pub mod compose;
pub mod kerning;
pub mod normalize;
pub mod report;
pub mod repository;
pub mod stages;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::config::PipelineConfig;
use crate::font_source::{DecodeError, LineStatsTable, Sample};
use crate::geometry::{GeometryError, OutlineEngine};

pub use report::{FailureReason, RunReport};
pub use repository::GlyphRepository;

/// Something a stage leaves behind for later stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Samples,
    LineStatistics,
    NormalizedGlyphs,
    ComposedGlyphs,
    Anchors,
    Kerning,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("stage {stage} requires {capability}, which no stage provides")]
    Unprovided {
        stage: &'static str,
        capability: Capability,
    },
    #[error("stages {stages:?} depend on each other")]
    Cycle { stages: Vec<&'static str> },
    #[error("composition jobs {jobs:?} depend on each other")]
    JobCycle { jobs: Vec<String> },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{glyph}: line {line} has no baseline or cap-height reference samples")]
    MissingStatistics { glyph: String, line: i32 },
    #[error("{glyph}: missing constituents {missing:?}")]
    MissingConstituent { glyph: String, missing: Vec<String> },
    #[error("{glyph}: {source}")]
    Geometry {
        glyph: String,
        #[source]
        source: GeometryError,
    },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("failed to read input {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn geometry(glyph: &str, source: GeometryError) -> Self {
        Self::Geometry {
            glyph: glyph.to_string(),
            source,
        }
    }
}

/// Everything the stages share. Each stage writes only its own part.
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub engine: Box<dyn OutlineEngine>,
    pub input_dir: PathBuf,
    pub samples: Vec<Sample>,
    pub line_stats: LineStatsTable,
    pub repository: GlyphRepository,
    pub report: RunReport,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig, engine: Box<dyn OutlineEngine>, input_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            engine,
            input_dir: input_dir.into(),
            samples: Vec::new(),
            line_stats: LineStatsTable::default(),
            repository: GlyphRepository::new(),
            report: RunReport::default(),
        }
    }
}

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn requires(&self) -> &'static [Capability];
    fn provides(&self) -> &'static [Capability];
    fn run(&self, context: &mut PipelineContext) -> Result<(), PipelineError>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Decode, calibrate, normalize, compose (with anchors), kern.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(stages::DecodeStage),
            Box::new(stages::LineStatisticsStage),
            Box::new(normalize::NormalizeStage),
            Box::new(compose::ComposeStage),
            Box::new(kerning::KerningStage),
        ])
    }

    /// Run order as indices into the stage list. Among ready stages the one
    /// listed first goes first.
    pub fn schedule(&self) -> Result<Vec<usize>, ScheduleError> {
        for stage in &self.stages {
            for capability in stage.requires() {
                if !self.stages.iter().any(|s| s.provides().contains(capability)) {
                    return Err(ScheduleError::Unprovided {
                        stage: stage.name(),
                        capability: *capability,
                    });
                }
            }
        }

        let mut provided: Vec<Capability> = Vec::new();
        let mut done = vec![false; self.stages.len()];
        let mut order = Vec::with_capacity(self.stages.len());
        while order.len() < self.stages.len() {
            let next = self.stages.iter().enumerate().position(|(i, stage)| {
                !done[i] && stage.requires().iter().all(|c| provided.contains(c))
            });
            let Some(index) = next else {
                let stages = self
                    .stages
                    .iter()
                    .zip(&done)
                    .filter(|(_, done)| !**done)
                    .map(|(s, _)| s.name())
                    .collect();
                return Err(ScheduleError::Cycle { stages });
            };
            done[index] = true;
            provided.extend_from_slice(self.stages[index].provides());
            order.push(index);
        }
        Ok(order)
    }

    pub fn run(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let order = self.schedule()?;
        for index in order {
            let stage = &self.stages[index];
            info!("Stage {} started", stage.name());
            stage.run(context)?;
            info!("Stage {} finished", stage.name());
        }
        context.report.sample_count = context.samples.len();
        context.report.glyph_count = context.repository.len();
        context.report.substitution_count = context.repository.substitutions.len();
        context.report.kerning_pair_count = context.repository.kerning.pairs.len();
        Ok(())
    }
}
