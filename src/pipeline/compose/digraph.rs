//! Two letterforms side by side as one glyph

use kurbo::Affine;

use super::encoded;
use crate::config::DigraphRecipe;
use crate::pipeline::repository::{Glyph, GlyphOrigin, GlyphRepository};
use crate::pipeline::PipelineError;

/// `first` followed by `second`, pulled together by `kerning`.
pub fn join(name: &str, first: &Glyph, second: &Glyph, kerning: f64) -> Glyph {
    let push = first.advance_width + kerning;
    let mut outline = first.outline.clone();
    outline.append(second.outline.transformed(Affine::translate((push, 0.0))));

    Glyph::new(
        name,
        outline,
        push + second.advance_width,
        GlyphOrigin::Digraph {
            first: first.name.clone(),
            second: second.name.clone(),
        },
    )
    .with_codepoints(encoded(name))
    .with_provenance(format!("{} + {}", first.name, second.name))
}

pub fn build(recipe: &DigraphRecipe, repo: &GlyphRepository) -> Result<Glyph, PipelineError> {
    match (repo.get(&recipe.first), repo.get(&recipe.second)) {
        (Some(first), Some(second)) => Ok(join(&recipe.name, first, second, recipe.kerning)),
        (first, second) => {
            let mut missing = Vec::new();
            if first.is_none() {
                missing.push(recipe.first.clone());
            }
            if second.is_none() {
                missing.push(recipe.second.clone());
            }
            Err(PipelineError::MissingConstituent {
                glyph: recipe.name.clone(),
                missing,
            })
        }
    }
}
