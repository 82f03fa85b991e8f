//! Glyph composition
//!
//! Every synthesized glyph is a job that declares the resources it reads and
//! writes. A job runs after every writer of anything it reads; writers of the
//! same resource keep their declaration order. Jobs whose inputs never
//! materialize are skipped and reported, never fatal.

pub mod accent;
pub mod digraph;
pub mod marks;
pub mod variants;

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

use super::anchors::place_anchors;
use super::repository::GlyphRepository;
use super::{Capability, PipelineContext, PipelineError, ScheduleError, Stage};
use crate::config::{
    BaseRecipe, CarveRecipe, DerivedGlyph, DerivedMarkRecipe, DigraphRecipe, OverlayRecipe,
    PipelineConfig,
};
use crate::font_source::glyph_names::{codepoint_for_name, glyph_name};
use crate::geometry::OutlineEngine;

pub use accent::AccentPlan;

/// Something a composition job reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Glyph(String),
    Anchors(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobKind {
    Carve(CarveRecipe),
    ExtractBase(BaseRecipe),
    DeriveMark(DerivedMarkRecipe),
    Overlay(OverlayRecipe),
    DeriveGlyph(DerivedGlyph),
    PlaceAnchors(String),
    Digraph(DigraphRecipe),
    Accent(AccentPlan),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub kind: JobKind,
    pub reads: Vec<Resource>,
    pub writes: Vec<Resource>,
}

fn glyph(name: &str) -> Resource {
    Resource::Glyph(name.to_string())
}

fn anchors(name: &str) -> Resource {
    Resource::Anchors(name.to_string())
}

impl Job {
    pub fn new(kind: JobKind) -> Self {
        let (reads, writes) = match &kind {
            JobKind::Carve(r) => {
                let mut writes: Vec<Resource> = r.spacing.iter().map(|s| glyph(s)).collect();
                writes.extend([glyph(&r.combining), anchors(&r.combining)]);
                (vec![glyph(&r.source)], writes)
            }
            JobKind::ExtractBase(r) => (
                vec![glyph(&r.source)],
                vec![glyph(&r.target), anchors(&r.target)],
            ),
            JobKind::DeriveMark(r) => (
                vec![glyph(&r.subject.glyph), glyph(&r.clip.glyph)],
                vec![glyph(&r.spacing), glyph(&r.combining), anchors(&r.combining)],
            ),
            JobKind::Overlay(r) => (vec![glyph(&r.source)], vec![glyph(&r.name)]),
            JobKind::DeriveGlyph(r) => {
                let mut reads: Vec<Resource> = r.parts.iter().map(|p| glyph(&p.glyph)).collect();
                reads.extend(r.width_from.iter().map(|w| glyph(w)));
                (reads, vec![glyph(&r.name)])
            }
            JobKind::PlaceAnchors(name) => (vec![glyph(name)], vec![anchors(name)]),
            JobKind::Digraph(r) => {
                let mut writes = vec![glyph(&r.name)];
                if r.anchors {
                    writes.push(anchors(&r.name));
                }
                (vec![glyph(&r.first), glyph(&r.second)], writes)
            }
            JobKind::Accent(plan) => (
                vec![
                    glyph(&plan.base),
                    anchors(&plan.base),
                    glyph(&plan.mark),
                    anchors(&plan.mark),
                ],
                vec![glyph(&plan.target), anchors(&plan.target)],
            ),
        };
        Self {
            kind,
            reads,
            writes,
        }
    }

    /// The glyph failures are reported against.
    pub fn label(&self) -> &str {
        match &self.kind {
            JobKind::Carve(r) => r.combining.as_str(),
            JobKind::ExtractBase(r) => r.target.as_str(),
            JobKind::DeriveMark(r) => r.combining.as_str(),
            JobKind::Overlay(r) => r.name.as_str(),
            JobKind::DeriveGlyph(r) => r.name.as_str(),
            JobKind::PlaceAnchors(name) => name.as_str(),
            JobKind::Digraph(r) => r.name.as_str(),
            JobKind::Accent(plan) => plan.target.as_str(),
        }
    }

    /// Glyph inputs absent from the repository.
    pub fn missing_inputs(&self, repo: &GlyphRepository) -> Vec<String> {
        self.reads
            .iter()
            .filter_map(|r| match r {
                Resource::Glyph(name) if !repo.contains(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Encoding for a synthesized glyph name, if it has one.
pub(crate) fn encoded(name: &str) -> Vec<char> {
    codepoint_for_name(name).into_iter().collect()
}

/// Every composition job for the current repository, in declaration order.
pub fn plan(config: &PipelineConfig, repo: &GlyphRepository) -> Vec<Job> {
    let tables = &config.compose;
    let mut jobs: Vec<Job> = Vec::new();
    jobs.extend(tables.carve.iter().cloned().map(JobKind::Carve).map(Job::new));
    jobs.extend(tables.bases.iter().cloned().map(JobKind::ExtractBase).map(Job::new));
    jobs.extend(
        tables
            .derived_marks
            .iter()
            .cloned()
            .map(JobKind::DeriveMark)
            .map(Job::new),
    );
    jobs.extend(tables.overlay_marks.iter().cloned().map(JobKind::Overlay).map(Job::new));
    jobs.extend(
        tables
            .derived_glyphs
            .iter()
            .cloned()
            .map(JobKind::DeriveGlyph)
            .map(Job::new),
    );
    jobs.extend(
        tables
            .anchored
            .iter()
            .cloned()
            .map(JobKind::PlaceAnchors)
            .map(Job::new),
    );
    jobs.extend(tables.digraphs.iter().cloned().map(JobKind::Digraph).map(Job::new));
    let late: Vec<Job> = tables
        .late_digraphs
        .iter()
        .cloned()
        .map(JobKind::Digraph)
        .map(Job::new)
        .collect();

    let written: HashSet<String> = jobs
        .iter()
        .chain(&late)
        .flat_map(|j| &j.writes)
        .filter_map(|r| match r {
            Resource::Glyph(name) => Some(name.clone()),
            Resource::Anchors(_) => None,
        })
        .collect();

    let (start, end) = tables.accents.sweep;
    for codepoint in (start..=end).filter_map(char::from_u32) {
        let target = glyph_name(codepoint);
        if repo.contains(&target) || written.contains(&target) {
            continue;
        }
        if let Some((base, mark)) = accent::decompose(codepoint, &tables.accents) {
            jobs.push(Job::new(JobKind::Accent(AccentPlan {
                target,
                codepoint,
                base: glyph_name(base),
                mark: glyph_name(mark),
            })));
        }
    }

    jobs.extend(late);
    jobs
}

/// Topological order of `jobs`; among ready jobs the earliest declared
/// runs first.
pub fn order_jobs(jobs: &[Job]) -> Result<Vec<usize>, ScheduleError> {
    let mut writers: HashMap<&Resource, Vec<usize>> = HashMap::new();
    for (index, job) in jobs.iter().enumerate() {
        for resource in &job.writes {
            writers.entry(resource).or_default().push(index);
        }
    }

    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); jobs.len()];
    let mut indegree = vec![0usize; jobs.len()];
    let mut add_edge = |from: usize, to: usize| {
        if from != to && successors[from].insert(to) {
            indegree[to] += 1;
        }
    };

    for list in writers.values() {
        for pair in list.windows(2) {
            add_edge(pair[0], pair[1]);
        }
    }
    for (index, job) in jobs.iter().enumerate() {
        for resource in &job.reads {
            for &writer in writers.get(resource).into_iter().flatten() {
                add_edge(writer, index);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..jobs.len()).filter(|i| indegree[*i] == 0).collect();
    let mut order = Vec::with_capacity(jobs.len());
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &succ in &successors[next] {
            indegree[succ] -= 1;
            if indegree[succ] == 0 {
                ready.insert(succ);
            }
        }
    }

    if order.len() < jobs.len() {
        let jobs = jobs
            .iter()
            .enumerate()
            .filter(|(i, _)| indegree[*i] > 0)
            .map(|(_, j)| j.label().to_string())
            .collect();
        return Err(ScheduleError::JobCycle { jobs });
    }
    Ok(order)
}

/// Run one job against the repository.
pub fn run_job(
    job: &Job,
    repo: &mut GlyphRepository,
    config: &PipelineConfig,
    engine: &dyn OutlineEngine,
) -> Result<(), PipelineError> {
    let missing = job.missing_inputs(repo);
    if !missing.is_empty() {
        return Err(PipelineError::MissingConstituent {
            glyph: job.label().to_string(),
            missing,
        });
    }

    let tables = &config.compose;
    let built = match &job.kind {
        JobKind::Carve(recipe) => marks::carve(recipe, repo, tables, engine)?,
        JobKind::ExtractBase(recipe) => vec![marks::extract_base(recipe, repo)?],
        JobKind::DeriveMark(recipe) => marks::derive_mark(recipe, repo, tables, &config.finalize, engine)?,
        JobKind::Overlay(recipe) => vec![marks::overlay(recipe, repo)?],
        JobKind::DeriveGlyph(recipe) => vec![marks::derive_glyph(recipe, repo, tables, engine)?],
        JobKind::PlaceAnchors(name) => {
            if let Some(glyph) = repo.get_mut(name) {
                place_anchors(glyph, &config.anchors);
            }
            return Ok(());
        }
        JobKind::Digraph(recipe) => {
            let mut glyph = digraph::build(recipe, repo)?;
            if recipe.anchors {
                place_anchors(&mut glyph, &config.anchors);
            }
            vec![glyph]
        }
        JobKind::Accent(plan) => return accent::build(plan, repo, &tables.accents, tables.bearings),
    };

    for glyph in built {
        debug!("Composed {}", glyph.name);
        repo.insert(glyph);
    }
    Ok(())
}

/// Builds marks, letters, digraphs and accented glyphs, and wires up the
/// substitution rules.
pub struct ComposeStage;

impl Stage for ComposeStage {
    fn name(&self) -> &'static str {
        "compose"
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::NormalizedGlyphs]
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::ComposedGlyphs, Capability::Anchors]
    }

    fn run(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let jobs = plan(&context.config, &context.repository);
        let order = order_jobs(&jobs)?;

        let before = context.repository.len();
        let mut skipped = 0;
        for index in order {
            let job = &jobs[index];
            match run_job(job, &mut context.repository, &context.config, context.engine.as_ref()) {
                Ok(()) => {}
                // the sweep tries every code point; gaps there are expected
                Err(PipelineError::MissingConstituent { glyph, missing })
                    if matches!(job.kind, JobKind::Accent(_)) =>
                {
                    debug!("No {glyph}: missing {}", missing.join(", "));
                    context.report.skipped_accents += 1;
                }
                Err(error) => {
                    skipped += 1;
                    context.report.record(error);
                }
            }
        }

        variants::wire_substitutions(&mut context.repository, &context.config.compose);
        variants::apply_placements(&mut context.repository, &context.config.compose.accents);

        info!(
            "Composed {} glyphs from {} jobs ({} skipped, {} sweep targets absent), {} substitution rules",
            context.repository.len() - before,
            jobs.len(),
            skipped,
            context.report.skipped_accents,
            context.repository.substitutions.len()
        );
        Ok(())
    }
}
