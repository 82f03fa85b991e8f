//! Class kerning plus ink-measured pair passes

pub mod classify;
pub mod passes;

use tracing::info;

use super::repository::{GlyphRepository, KerningTable};
use super::{Capability, PipelineContext, PipelineError, Stage};
use crate::config::KerningTables;

/// Group every glyph by side shape, then run the kerning rules in order.
pub fn build_kerning(repo: &GlyphRepository, tables: &KerningTables) -> KerningTable {
    let (left_groups, right_groups) = classify::groups(repo, tables);
    let mut table = KerningTable {
        left_groups,
        right_groups,
        matrix: tables.matrix,
        pairs: Default::default(),
    };
    passes::apply_rules(repo, tables, &mut table.pairs);
    table
}

/// Runs once the glyph set is final.
pub struct KerningStage;

impl Stage for KerningStage {
    fn name(&self) -> &'static str {
        "kerning"
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::ComposedGlyphs, Capability::Anchors]
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::Kerning]
    }

    fn run(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let table = build_kerning(&context.repository, &context.config.kerning);
        info!(
            "Kerning: {} left / {} right glyphs grouped, {} pair overrides",
            table.left_groups.iter().map(|g| g.len()).sum::<usize>(),
            table.right_groups.iter().map(|g| g.len()).sum::<usize>(),
            table.pairs.len()
        );
        context.repository.kerning = table;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KerningRule;
    use crate::geometry::Outline;
    use crate::pipeline::repository::{Glyph, GlyphOrigin};
    use kurbo::BezPath;

    fn block(name: &str, x0: f64, x1: f64, width: f64) -> Glyph {
        let mut p = BezPath::new();
        p.move_to((x0, 0.0));
        p.line_to((x1, 0.0));
        p.line_to((x1, 560.0));
        p.line_to((x0, 560.0));
        p.close_path();
        Glyph::new(name, Outline::new(vec![p]), width, GlyphOrigin::Space)
    }

    #[test]
    fn pair_override_beats_the_matrix() {
        let mut repo = GlyphRepository::new();
        repo.insert(block("T", 20.0, 400.0, 440.0));
        repo.insert(block("O", 20.0, 420.0, 480.0));
        repo.insert(block("T_T", 20.0, 760.0, 800.0));
        let tables = KerningTables {
            rules: vec![KerningRule::Pair {
                left: vec!["T_T".into()],
                right: vec!["O".into()],
                value: -70,
            }],
            ..KerningTables::default()
        };
        let table = build_kerning(&repo, &tables);
        // T ends complex, O starts with a bowl
        assert_eq!(table.class_value("T_T", "O"), tables.matrix[2][2]);
        assert_eq!(table.lookup("T_T", "O"), -70);
        assert_eq!(table.lookup("T", "O"), tables.matrix[2][2]);
    }
}
