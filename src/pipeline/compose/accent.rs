//! Accented letters from a base glyph and a combining mark

use icu_normalizer::properties::{CanonicalDecompositionBorrowed, Decomposed};
use kurbo::{Affine, Vec2};
use tracing::debug;

use crate::config::AccentRules;
use crate::pipeline::repository::{
    AnchorClass, AnchorRole, Glyph, GlyphOrigin, GlyphRepository, PairAdjustment, ValueRecord,
};
use crate::pipeline::PipelineError;

/// A planned composition: `target` from `base` plus `mark`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccentPlan {
    pub target: String,
    pub codepoint: char,
    pub base: String,
    pub mark: String,
}

/// Base and mark code points for `target`, after the exception table and
/// the locale rules. `None` when the character is not a base + mark pair.
pub fn decompose(target: char, rules: &AccentRules) -> Option<(char, char)> {
    let (mut base, mut mark) = match rules.exceptions.iter().find(|e| e.target == target) {
        Some(exception) => (exception.base, exception.mark),
        None => match CanonicalDecompositionBorrowed::new().decompose(target) {
            Decomposed::Expansion(base, mark) => (base, mark),
            _ => return None,
        },
    };

    let (first, last) = rules.dotless_marks;
    if (first..=last).contains(&u32::from(mark)) {
        if let Some(rule) = rules.dotless.iter().find(|r| r.base == base) {
            base = rule.replacement;
        }
    }

    if let Some(sub) = rules
        .substitutions
        .iter()
        .find(|s| s.mark == mark && s.bases.contains(&base) != s.unless)
    {
        mark = sub.replacement;
    }

    Some((base, mark))
}

/// A composed glyph and how far the mark was moved to build it.
#[derive(Debug, Clone)]
pub struct ComposedAccent {
    pub glyph: Glyph,
    pub mark_offset: Vec2,
    pub attachment: Option<AnchorClass>,
}

/// Place `mark` on `base`.
///
/// The first class for which the base has a base anchor and the mark a mark
/// anchor decides the position; without one the mark is centred on the
/// base. The base's anchors carry over, and the consumed one moves up to the
/// mark's stacking point so further marks land on top of this one.
pub fn compose(name: &str, base: &Glyph, mark: &Glyph) -> ComposedAccent {
    let attachment = AnchorClass::ATTACHMENT_ORDER.iter().find_map(|class| {
        let on_base = base.anchor(*class, AnchorRole::Base)?;
        let on_mark = mark.anchor(*class, AnchorRole::Mark)?;
        Some((*class, on_base, on_mark))
    });

    let offset = match attachment {
        Some((_, on_base, on_mark)) => on_base - on_mark,
        None => match (base.bounding_box(), mark.bounding_box()) {
            (Some(b), Some(m)) => Vec2::new(b.center().x - m.center().x, 0.0),
            _ => Vec2::ZERO,
        },
    };

    let mut outline = base.outline.clone();
    outline.append(mark.outline.transformed(Affine::translate(offset)));

    let mut glyph = Glyph::new(
        name,
        outline,
        base.advance_width,
        GlyphOrigin::Accent {
            base: base.name.clone(),
            mark: mark.name.clone(),
        },
    )
    .with_provenance(format!("{} + {}", base.name, mark.name));
    glyph.anchors = base.anchors.clone();

    if let Some((class, _, _)) = attachment {
        if let Some(stack) = mark.anchor(AnchorClass::Top1, AnchorRole::BaseMark) {
            glyph.set_anchor(class, AnchorRole::Base, stack + offset);
        }
    }

    ComposedAccent {
        glyph,
        mark_offset: offset,
        attachment: attachment.map(|(class, _, _)| class),
    }
}

/// Compose `plan` into the repository, with the side-accent spacing fixes.
pub fn build(
    plan: &AccentPlan,
    repo: &mut GlyphRepository,
    rules: &AccentRules,
    bearings: (f64, f64),
) -> Result<(), PipelineError> {
    let (Some(base), Some(mark)) = (repo.get(&plan.base), repo.get(&plan.mark)) else {
        let missing = [&plan.base, &plan.mark]
            .into_iter()
            .filter(|n| !repo.contains(n))
            .cloned()
            .collect();
        return Err(PipelineError::MissingConstituent {
            glyph: plan.target.clone(),
            missing,
        });
    };

    let composed = compose(&plan.target, base, mark);
    let mut glyph = composed.glyph.with_codepoints(vec![plan.codepoint]);
    let mut adjustments = Vec::new();

    if rules.respaced_bases.contains(&plan.base) {
        let before = glyph.advance_width;
        glyph.set_bearings(bearings.0, bearings.1);
        let added = (glyph.advance_width - before).round() as i32;
        adjustments.push(PairAdjustment {
            first: plan.base.clone(),
            second: plan.mark.clone(),
            first_value: ValueRecord {
                x_placement: added.div_euclid(2),
                x_advance: added,
            },
            second_value: ValueRecord::default(),
        });
    }

    for rule in rules
        .widened
        .iter()
        .filter(|r| r.mark == plan.mark && r.targets.contains(&plan.target))
    {
        glyph.advance_width += rule.amount;
        adjustments.push(PairAdjustment {
            first: plan.base.clone(),
            second: plan.mark.clone(),
            first_value: ValueRecord {
                x_placement: 0,
                x_advance: rule.amount.round() as i32,
            },
            second_value: ValueRecord::default(),
        });
    }

    debug!(
        "Composed {} from {} + {} ({:?})",
        plan.target, plan.base, plan.mark, composed.attachment
    );
    repo.insert(glyph);
    for adjustment in adjustments {
        repo.add_pair_adjustment(adjustment);
    }
    Ok(())
}
