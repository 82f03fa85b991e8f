//! Substitution rules and pair placements

use tracing::debug;

use crate::config::{AccentRules, ComposeTables};
use crate::pipeline::repository::{
    GlyphOrigin, GlyphRepository, PairAdjustment, SubstitutionRule, ValueRecord,
};

/// Ligature rules for every ligature glyph and variant rules for every
/// `X.suffix` whose base `X` exists.
pub fn wire_substitutions(repo: &mut GlyphRepository, tables: &ComposeTables) {
    let mut rules = Vec::new();

    for glyph in repo.glyphs() {
        if let GlyphOrigin::Ligature { components } = &glyph.origin {
            rules.push(SubstitutionRule::ligature(components.clone(), &glyph.name));
            continue;
        }

        let Some((base, suffix)) = glyph.name.split_once('.') else {
            continue;
        };
        if !repo.contains(base) {
            continue;
        }
        for variant in tables.variants.iter().filter(|v| v.suffix == suffix) {
            rules.push(SubstitutionRule::variant(base, &glyph.name, &variant.feature, vec![]));
            if !variant.after.is_empty() {
                rules.push(SubstitutionRule::variant(
                    base,
                    &glyph.name,
                    "calt",
                    variant.after.clone(),
                ));
            }
        }
    }

    debug!("Wired {} substitution rules", rules.len());
    repo.substitutions.extend(rules);
}

/// Pair adjustments for the placement rules whose glyphs both exist.
pub fn apply_placements(repo: &mut GlyphRepository, rules: &AccentRules) {
    for rule in &rules.placements {
        if !(repo.contains(&rule.first) && repo.contains(&rule.second)) {
            continue;
        }
        repo.add_pair_adjustment(PairAdjustment {
            first: rule.first.clone(),
            second: rule.second.clone(),
            first_value: ValueRecord::default(),
            second_value: ValueRecord {
                x_placement: rule.x_placement,
                x_advance: 0,
            },
        });
    }
}
