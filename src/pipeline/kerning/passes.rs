//! Kerning passes measured against the ink

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::{KerningRule, KerningTables, PassMode, LETTERS};
use crate::pipeline::repository::{Glyph, GlyphRepository};

/// Horizontal ink extents of a glyph, one entry per profile row.
#[derive(Debug, Clone, PartialEq)]
pub struct InkProfile {
    pub advance_width: f64,
    rows: BTreeMap<i64, (f64, f64)>,
}

impl InkProfile {
    /// Sample the outline every `step` units, shifted up by `dy`.
    pub fn measure(glyph: &Glyph, step: f64, dy: f64) -> Self {
        let mut rows = BTreeMap::new();
        if let Some(bbox) = glyph.bounding_box() {
            let first = ((bbox.y0 + dy) / step).ceil() as i64;
            let last = ((bbox.y1 + dy) / step).floor() as i64;
            for row in first..=last {
                let y = row as f64 * step - dy;
                if let Some(extent) = glyph.outline.ink_extent_at(y) {
                    rows.insert(row, extent);
                }
            }
        }
        Self {
            advance_width: glyph.advance_width,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Closest horizontal approach of the two inks when set unkerned, over the
/// rows both glyphs have ink on. `None` when they share no row.
pub fn natural_separation(left: &InkProfile, right: &InkProfile) -> Option<f64> {
    left.rows
        .iter()
        .filter_map(|(row, &(_, lmax))| {
            let &(rmin, _) = right.rows.get(row)?;
            Some(left.advance_width - lmax + rmin)
        })
        .reduce(f64::min)
}

/// The kerning a pass assigns to a pair, if the pass applies to it.
pub fn pass_value(natural: f64, separation: f64, min_kern: f64, mode: PassMode) -> Option<i32> {
    let kern = (separation - natural).round();
    if kern == 0.0 || kern.abs() < min_kern {
        return None;
    }
    let applies = match mode {
        PassMode::Any => true,
        PassMode::OnlyTightening => kern < 0.0,
        PassMode::Touching => natural <= 0.0,
    };
    applies.then_some(kern as i32)
}

/// Glyph names a rule list refers to, with the letters placeholder expanded
/// and absent glyphs dropped.
pub fn expand(names: &[String], repo: &GlyphRepository) -> Vec<String> {
    let mut expanded = Vec::new();
    for name in names {
        if name == LETTERS {
            expanded.extend(
                repo.names()
                    .filter(|n| is_letter(n))
                    .map(str::to_string),
            );
        } else if repo.contains(name) {
            expanded.push(name.clone());
        }
    }
    expanded
}

fn is_letter(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_alphabetic(),
        _ => name.contains('_') && name.len() < 8,
    }
}

/// Run every rule in order. Later rules overwrite earlier values for the
/// same pair.
pub fn apply_rules(
    repo: &GlyphRepository,
    tables: &KerningTables,
    pairs: &mut BTreeMap<(String, String), i32>,
) {
    let offsets: HashMap<&str, f64> = tables
        .measurement_offsets
        .iter()
        .map(|o| (o.glyph.as_str(), o.dy))
        .collect();
    let mut profiles: HashMap<String, InkProfile> = HashMap::new();

    for rule in &tables.rules {
        match rule {
            KerningRule::Pair { left, right, value } => {
                for l in expand(left, repo) {
                    for r in expand(right, repo) {
                        pairs.insert((l.clone(), r), *value);
                    }
                }
            }
            KerningRule::Pass {
                separation,
                left,
                right,
                min_kern,
                mode,
            } => {
                let left = expand(left, repo);
                let right = expand(right, repo);

                let unmeasured: Vec<&String> = left
                    .iter()
                    .chain(right.iter())
                    .filter(|n| !profiles.contains_key(*n))
                    .collect();
                let measured: Vec<(String, InkProfile)> = unmeasured
                    .into_par_iter()
                    .filter_map(|name| {
                        let glyph = repo.get(name)?;
                        let dy = offsets.get(name.as_str()).copied().unwrap_or(0.0);
                        Some((name.clone(), InkProfile::measure(glyph, tables.profile_step, dy)))
                    })
                    .collect();
                profiles.extend(measured);

                let found: Vec<((String, String), i32)> = left
                    .par_iter()
                    .flat_map_iter(|l| right.iter().map(move |r| (l, r)))
                    .filter_map(|(l, r)| {
                        let natural = natural_separation(profiles.get(l)?, profiles.get(r)?)?;
                        let value = pass_value(natural, *separation, *min_kern, *mode)?;
                        Some(((l.clone(), r.clone()), value))
                    })
                    .collect();
                debug!(
                    "Kerning pass at {} set {} of {} pairs",
                    separation,
                    found.len(),
                    left.len() * right.len()
                );
                pairs.extend(found);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Outline;
    use crate::pipeline::repository::GlyphOrigin;
    use kurbo::BezPath;

    fn block(name: &str, x0: f64, x1: f64, width: f64) -> Glyph {
        let mut p = BezPath::new();
        p.move_to((x0, 0.0));
        p.line_to((x1, 0.0));
        p.line_to((x1, 500.0));
        p.line_to((x0, 500.0));
        p.close_path();
        Glyph::new(name, Outline::new(vec![p]), width, GlyphOrigin::Space)
    }

    #[test]
    fn natural_separation_is_the_closest_row() {
        let left = InkProfile::measure(&block("H", 20.0, 400.0, 440.0), 10.0, 0.0);
        let right = InkProfile::measure(&block("I", 30.0, 90.0, 130.0), 10.0, 0.0);
        assert_eq!(natural_separation(&left, &right), Some(70.0));

        let lifted = InkProfile::measure(&block("I", 30.0, 90.0, 130.0), 10.0, 1000.0);
        assert_eq!(natural_separation(&left, &lifted), None);
    }

    #[test]
    fn modes_gate_the_pass() {
        assert_eq!(pass_value(70.0, 40.0, 0.0, PassMode::Any), Some(-30));
        assert_eq!(pass_value(70.0, 100.0, 0.0, PassMode::Any), Some(30));
        assert_eq!(pass_value(70.0, 100.0, 0.0, PassMode::OnlyTightening), None);
        assert_eq!(pass_value(70.0, 40.0, 0.0, PassMode::OnlyTightening), Some(-30));
        assert_eq!(pass_value(70.0, 40.0, 0.0, PassMode::Touching), None);
        assert_eq!(pass_value(-10.0, 40.0, 0.0, PassMode::Touching), Some(50));
        assert_eq!(pass_value(70.0, 50.0, 30.0, PassMode::Any), None);
        assert_eq!(pass_value(70.0, 70.2, 0.0, PassMode::Any), None);
    }

    #[test]
    fn letters_placeholder_expands_to_present_letters() {
        let mut repo = GlyphRepository::new();
        for name in ["A", "z", "T_T", "period", "germandbls", "Agrave"] {
            repo.insert(block(name, 0.0, 10.0, 20.0));
        }
        let names = expand(&[LETTERS.to_string(), "period".into(), "X".into()], &repo);
        assert_eq!(names, vec!["A", "T_T", "z", "period"]);
    }

    #[test]
    fn later_rules_overwrite_earlier_ones() {
        let mut repo = GlyphRepository::new();
        repo.insert(block("r", 20.0, 200.0, 240.0));
        repo.insert(block("a", 20.0, 300.0, 340.0));
        let tables = KerningTables {
            rules: vec![
                KerningRule::Pass {
                    separation: 20.0,
                    left: vec!["r".into()],
                    right: vec![LETTERS.into()],
                    min_kern: 0.0,
                    mode: PassMode::Any,
                },
                KerningRule::Pair {
                    left: vec!["r".into()],
                    right: vec!["a".into()],
                    value: -5,
                },
            ],
            ..KerningTables::default()
        };
        let mut pairs = BTreeMap::new();
        apply_rules(&repo, &tables, &mut pairs);
        assert_eq!(pairs.get(&("r".to_string(), "a".to_string())), Some(&-5));
        // natural 40 + 20 = 60, target 20
        assert_eq!(pairs.get(&("r".to_string(), "r".to_string())), Some(&-40));
    }
}
