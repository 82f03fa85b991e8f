//! Marks and letters carved or derived from scanned glyphs

use kurbo::{Affine, Point, Vec2};

use super::encoded;
use crate::config::{
    BandFilter, BaseRecipe, CarveRecipe, ComposeTables, DerivedGlyph, DerivedMarkRecipe,
    FinalizeSettings, OverlayRecipe, SourceOutline,
};
use crate::geometry::{ops, GeometryError, Outline, OutlineEngine};
use crate::pipeline::repository::{AnchorClass, AnchorRole, Glyph, GlyphOrigin, GlyphRepository};
use crate::pipeline::PipelineError;

/// Clearance below the mark's visual centre used as its attachment height.
const MARK_DROP: f64 = 65.0;

fn source<'a>(repo: &'a GlyphRepository, name: &str, job: &str) -> Result<&'a Glyph, PipelineError> {
    repo.get(name).ok_or_else(|| PipelineError::MissingConstituent {
        glyph: job.to_string(),
        missing: vec![name.to_string()],
    })
}

/// An edited copy of an existing glyph's outline.
fn source_outline(
    spec: &SourceOutline,
    repo: &GlyphRepository,
    engine: &dyn OutlineEngine,
    job: &str,
) -> Result<Outline, PipelineError> {
    let glyph = source(repo, &spec.glyph, job)?;
    let mut outline = glyph.outline.clone();
    let mut advance = glyph.advance_width;
    ops::apply_all(&spec.ops, &mut outline, &mut advance, engine)
        .map_err(|e| PipelineError::geometry(job, e))?;
    Ok(outline)
}

/// Drop the contours the band filters exclude.
pub fn apply_bands(outline: Outline, bands: &[BandFilter]) -> Outline {
    bands.iter().fold(outline, |outline, band| match *band {
        BandFilter::Above { y } => outline.split_above(y).rest,
        BandFilter::Below { y } => outline.split_below(y).rest,
    })
}

/// Split a scanned accented glyph at the cut line: the part beyond it becomes
/// a spacing accent and a zero-width combining mark.
pub fn carve(
    recipe: &CarveRecipe,
    repo: &GlyphRepository,
    tables: &ComposeTables,
    engine: &dyn OutlineEngine,
) -> Result<Vec<Glyph>, PipelineError> {
    let job = recipe.combining.as_str();
    let outline = source_outline(&SourceOutline::new(&recipe.source, recipe.prepare.clone()), repo, engine, job)?;
    let empty = |operation| PipelineError::geometry(job, GeometryError::EmptyResult { operation });

    let bbox = outline.bounding_box().ok_or_else(|| empty("carve"))?;
    let split = match recipe.class {
        AnchorClass::Bottom => outline.split_above(recipe.cut),
        _ => outline.split_below(recipe.cut),
    };
    let (body, mut mark) = (split.selected, split.rest);
    let raw = mark.bounding_box().ok_or_else(|| empty("carve"))?;

    let mut ytop = body.bounding_box().map_or(0.0, |b| b.y1.max(0.0));
    ytop = ytop.max(0.2 * raw.y1 + 0.8 * raw.y0 - MARK_DROP / recipe.scale);

    let (mut xmin, mut xmax) = (bbox.x0, bbox.x1);
    let pivot = Vec2::new((xmin + xmax) / 2.0, ytop);
    mark.apply_affine(
        Affine::translate(pivot) * Affine::scale(recipe.scale) * Affine::translate(-pivot),
    );
    let mbox = mark.bounding_box().ok_or_else(|| empty("carve"))?;
    if recipe.center_on_mark {
        (xmin, xmax) = (mbox.x0, mbox.x1);
    }
    let mid = (xmin + xmax) / 2.0;
    let (left, right) = tables.bearings;

    let origin = GlyphOrigin::Carved {
        source: recipe.source.clone(),
    };
    let mut combining = Glyph::new(&recipe.combining, mark.clone(), 0.0, origin.clone())
        .with_codepoints(encoded(&recipe.combining))
        .with_provenance(&recipe.source);

    let rspace = match recipe.class {
        AnchorClass::UpperRight => {
            combining.set_anchor(recipe.class, AnchorRole::Mark, Point::new(xmin, mbox.y1));
            -right
        }
        AnchorClass::Bottom => {
            combining.set_anchor(recipe.class, AnchorRole::Mark, Point::new(mid, mbox.y1));
            right
        }
        class => {
            combining.set_anchor(class, AnchorRole::Mark, Point::new(mid, ytop));
            if class == AnchorClass::Top {
                combining.set_anchor(AnchorClass::Top1, AnchorRole::Mark, Point::new(mid, ytop));
                combining.set_anchor(
                    AnchorClass::Top1,
                    AnchorRole::BaseMark,
                    Point::new(mid, mbox.y1 - recipe.basemark_drop),
                );
            }
            right
        }
    };
    combining.translate(Vec2::new(-xmax - rspace, 0.0));

    let mut built = Vec::with_capacity(2);
    if let Some(name) = &recipe.spacing {
        let mut spacing = Glyph::new(name, mark, 0.0, origin)
            .with_codepoints(encoded(name))
            .with_provenance(&recipe.source);
        spacing.set_bearings(left, right);
        built.push(spacing);
    }
    built.push(combining);
    Ok(built)
}

/// The letter body below the cut line, with a top anchor for new marks.
pub fn extract_base(recipe: &BaseRecipe, repo: &GlyphRepository) -> Result<Glyph, PipelineError> {
    let job = recipe.target.as_str();
    let from = source(repo, &recipe.source, job)?;
    let empty = || PipelineError::geometry(job, GeometryError::EmptyResult { operation: "extract base" });

    let bbox = from.bounding_box().ok_or_else(empty)?;
    let split = from.outline.split_below(recipe.cut);
    let body_box = split.selected.bounding_box().ok_or_else(empty)?;
    let ytop = recipe.min_top.max(body_box.y1);

    let span = if recipe.center_on_accent {
        split.rest.bounding_box().unwrap_or(bbox)
    } else {
        bbox
    };

    let mut glyph = Glyph::new(
        &recipe.target,
        split.selected,
        from.advance_width,
        GlyphOrigin::Carved {
            source: recipe.source.clone(),
        },
    )
    .with_codepoints(encoded(&recipe.target))
    .with_provenance(&recipe.source);
    glyph.set_anchor(
        AnchorClass::Top,
        AnchorRole::Base,
        Point::new((span.x0 + span.x1) / 2.0, ytop),
    );
    Ok(glyph)
}

/// Exclude, band-crop, edit, stroke-expand to an even weight, then
/// simplify and snap like every normalized glyph.
pub fn derive_mark(
    recipe: &DerivedMarkRecipe,
    repo: &GlyphRepository,
    tables: &ComposeTables,
    finalize: &FinalizeSettings,
    engine: &dyn OutlineEngine,
) -> Result<Vec<Glyph>, PipelineError> {
    let job = recipe.combining.as_str();
    let geometry = |e| PipelineError::geometry(job, e);

    let subject = source_outline(&recipe.subject, repo, engine, job)?;
    let clip = source_outline(&recipe.clip, repo, engine, job)?;
    let excluded = engine.exclude(&subject, &clip).map_err(geometry)?;
    let mut mark = apply_bands(excluded, &recipe.bands);
    let mut advance = 0.0;
    ops::apply_all(&recipe.ops, &mut mark, &mut advance, engine).map_err(geometry)?;
    for _ in 0..recipe.stroke_passes {
        mark.simplify(1.0);
        mark = engine.stroke_expand(&mark, recipe.stroke_width).map_err(geometry)?;
    }
    mark.finalize(finalize.tolerance, finalize.passes);
    if mark.is_empty() {
        return Err(geometry(GeometryError::EmptyResult {
            operation: "derive mark",
        }));
    }

    let origin = GlyphOrigin::Derived {
        sources: vec![recipe.subject.glyph.clone(), recipe.clip.glyph.clone()],
    };
    let provenance = format!("{} - {}", recipe.subject.glyph, recipe.clip.glyph);

    let mut spacing = Glyph::new(&recipe.spacing, mark.clone(), 0.0, origin.clone())
        .with_codepoints(encoded(&recipe.spacing))
        .with_provenance(&provenance);
    spacing.set_bearings(tables.bearings.0, tables.bearings.1);

    let mut combining = Glyph::new(&recipe.combining, mark, 0.0, origin)
        .with_codepoints(encoded(&recipe.combining))
        .with_provenance(provenance);
    combining.translate(Vec2::new(recipe.combining_shift, 0.0));
    let top = combining.bounding_box().map_or(0.0, |b| b.y1);
    for spec in &recipe.anchors {
        combining.set_anchor(spec.class, spec.role, Point::new(spec.x, spec.y.unwrap_or(top)));
    }
    combining.translate(Vec2::new(recipe.final_shift, 0.0));

    Ok(vec![spacing, combining])
}

/// A zero-width stroke-through mark ending `right_margin` left of the origin.
pub fn overlay(recipe: &OverlayRecipe, repo: &GlyphRepository) -> Result<Glyph, PipelineError> {
    let job = recipe.name.as_str();
    let from = source(repo, &recipe.source, job)?;
    let mut outline = apply_bands(from.outline.clone(), &recipe.bands);
    match recipe.rotate_onto_baseline {
        Some(degrees) => outline.rotate_onto_baseline(degrees),
        None => {
            if let Some(b) = outline.bounding_box() {
                outline.translate(0.0, -b.y0);
            }
        }
    }
    let bbox = outline.bounding_box().ok_or_else(|| {
        PipelineError::geometry(job, GeometryError::EmptyResult { operation: "overlay" })
    })?;
    outline.translate(-recipe.right_margin - bbox.x1, 0.0);

    Ok(Glyph::new(
        &recipe.name,
        outline,
        0.0,
        GlyphOrigin::Carved {
            source: recipe.source.clone(),
        },
    )
    .with_codepoints(encoded(&recipe.name))
    .with_provenance(&recipe.source))
}

/// A glyph assembled from edited copies of other glyphs.
pub fn derive_glyph(
    recipe: &DerivedGlyph,
    repo: &GlyphRepository,
    tables: &ComposeTables,
    engine: &dyn OutlineEngine,
) -> Result<Glyph, PipelineError> {
    let job = recipe.name.as_str();
    let mut outline = Outline::default();
    for part in &recipe.parts {
        outline.append(source_outline(part, repo, engine, job)?);
    }

    let advance = match &recipe.width_from {
        Some(name) => source(repo, name, job)?.advance_width,
        None => 0.0,
    };
    let sources: Vec<String> = recipe.parts.iter().map(|p| p.glyph.clone()).collect();
    let provenance = sources.join(" + ");
    let mut glyph = Glyph::new(&recipe.name, outline, advance, GlyphOrigin::Derived { sources })
        .with_codepoints(encoded(&recipe.name))
        .with_provenance(provenance);

    let bearings = recipe
        .bearings
        .or_else(|| recipe.width_from.is_none().then_some(tables.bearings));
    if let Some((left, right)) = bearings {
        glyph.set_bearings(left, right);
    }
    Ok(glyph)
}
