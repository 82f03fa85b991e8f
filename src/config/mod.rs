//! Pipeline policy tables
//!
//! Every per-glyph exception the pipeline applies lives here as data: the
//! reference sets used for line calibration, spacing exceptions, special-case
//! transforms, composition recipes, anchor overrides and the kerning rules.
//! `PipelineConfig::default()` is the built-in repertoire; a JSON file with the
//! same shape can replace it (`--tables`), and `--dump-tables` writes the
//! defaults out for auditing.

mod defaults;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::font_source::FontInfo;
use crate::geometry::OutlineOp;
use crate::pipeline::repository::{AnchorClass, AnchorRole};

/// Stand-in for "every letter and letter ligature" in kerning glyph lists.
pub const LETTERS: &str = "@letters";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub font: FontInfo,
    pub references: ReferenceSets,
    pub samples: SampleTables,
    pub spacing: SpacingTable,
    /// Stroke weight added to every sample written on the given line.
    pub line_weights: Vec<LineWeight>,
    /// Applied in order after scaling and placement, keyed by sample text.
    pub overrides: Vec<TransformOverride>,
    pub finalize: FinalizeSettings,
    pub space_width: f64,
    pub compose: ComposeTables,
    pub anchors: AnchorTables,
    pub kerning: KerningTables,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy tables {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse policy tables {}", path.display()))?;
        debug!("Loaded policy tables from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write policy tables {}", path.display()))?;
        debug!("Saved policy tables to {:?}", path);
        Ok(())
    }

    /// Width padding in units of the side padding for `glyph`.
    pub fn width_pads(&self, glyph: &str) -> f64 {
        self.spacing
            .exceptions
            .iter()
            .filter(|e| e.glyphs.iter().any(|g| g == glyph))
            .find_map(|e| e.width_pads)
            .unwrap_or(self.spacing.default_width_pads)
    }

    /// Horizontal shift in units of the side padding for `glyph`.
    pub fn shift_pads(&self, glyph: &str) -> f64 {
        self.spacing
            .exceptions
            .iter()
            .filter(|e| e.glyphs.iter().any(|g| g == glyph))
            .find_map(|e| e.shift_pads)
            .unwrap_or(self.spacing.default_shift_pads)
    }
}

/// Single code points whose boxes calibrate each text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSets {
    /// Bottom edges of these average to the line's baseline.
    pub baseline: Vec<char>,
    /// Top edges of these average to the line's cap height.
    pub cap_height: Vec<char>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleTables {
    pub choices: Vec<SampleChoice>,
    pub aliases: Vec<SampleAlias>,
}

/// Keep only the sample of `codepoints` written on `line`, or none at all
/// when `line` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleChoice {
    pub codepoints: String,
    pub line: Option<i32>,
}

/// Re-use the scan of `source` (optionally only from `line`) as `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAlias {
    pub source: String,
    pub line: Option<i32>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingTable {
    /// One unit of side padding, in design units.
    pub side_padding: f64,
    /// Advance = ink width + this many paddings.
    pub default_width_pads: f64,
    /// Ink is shifted right by this many paddings.
    pub default_shift_pads: f64,
    /// First matching entry with a value wins, per field.
    pub exceptions: Vec<SpacingException>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingException {
    pub glyphs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_pads: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_pads: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWeight {
    pub line: i32,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOverride {
    pub codepoints: String,
    pub ops: Vec<OutlineOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeSettings {
    pub tolerance: f64,
    pub passes: usize,
}

/// An existing glyph's outline with edits applied to a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceOutline {
    pub glyph: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ops: Vec<OutlineOp>,
}

impl SourceOutline {
    pub fn new(glyph: &str, ops: Vec<OutlineOp>) -> Self {
        Self {
            glyph: glyph.to_string(),
            ops,
        }
    }
}

/// Contour filters against a horizontal cut line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "drop", rename_all = "snake_case")]
pub enum BandFilter {
    /// Drop contours lying wholly at or above `y`.
    Above { y: f64 },
    /// Drop contours lying wholly at or below `y`.
    Below { y: f64 },
}

/// An anchor at a fixed position; `y: None` means the top of the ink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSpec {
    pub class: AnchorClass,
    pub role: AnchorRole,
    pub x: f64,
    pub y: Option<f64>,
}

/// Carve a spacing accent and its combining mark from a scanned glyph: the
/// contours beyond the 540 cut form the mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarveRecipe {
    pub source: String,
    /// Edits applied to a copy of the source before carving.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prepare: Vec<OutlineOp>,
    pub spacing: Option<String>,
    pub combining: String,
    pub class: AnchorClass,
    pub scale: f64,
    pub cut: f64,
    /// Centre the anchor on the carved mark instead of the whole source.
    #[serde(default)]
    pub center_on_mark: bool,
    /// Lowers the `top1` basemark anchor below the mark's ink top.
    #[serde(default)]
    pub basemark_drop: f64,
}

/// Extract the letter body below `cut` as a new base glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRecipe {
    pub source: String,
    pub target: String,
    pub cut: f64,
    pub min_top: f64,
    /// Centre the top anchor on the removed accent (the dot of j).
    #[serde(default)]
    pub center_on_accent: bool,
}

/// Derive a mark from letter strokes: exclude, band-crop, stroke-expand,
/// simplify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMarkRecipe {
    pub spacing: String,
    pub combining: String,
    pub subject: SourceOutline,
    pub clip: SourceOutline,
    pub bands: Vec<BandFilter>,
    pub ops: Vec<OutlineOp>,
    pub stroke_width: f64,
    pub stroke_passes: usize,
    /// Shift of the combining copy before its anchors are attached.
    pub combining_shift: f64,
    pub anchors: Vec<AnchorSpec>,
    /// Shift applied to the combining copy and its anchors at the end.
    pub final_shift: f64,
}

/// Combining overlay (stroke-through) marks; these carry no anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecipe {
    pub name: String,
    pub source: String,
    pub bands: Vec<BandFilter>,
    pub rotate_onto_baseline: Option<f64>,
    /// The ink ends this far left of the origin.
    pub right_margin: f64,
}

/// A glyph assembled from edited copies of other glyphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedGlyph {
    pub name: String,
    pub parts: Vec<SourceOutline>,
    #[serde(default)]
    pub width_from: Option<String>,
    #[serde(default)]
    pub bearings: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigraphRecipe {
    pub name: String,
    pub first: String,
    pub second: String,
    pub kerning: f64,
    #[serde(default)]
    pub anchors: bool,
}

impl DigraphRecipe {
    pub fn new(first: &str, second: &str, name: &str, kerning: f64, anchors: bool) -> Self {
        Self {
            name: name.to_string(),
            first: first.to_string(),
            second: second.to_string(),
            kerning,
            anchors,
        }
    }
}

/// Decomposition used instead of the canonical one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionException {
    pub target: char,
    pub base: char,
    pub mark: char,
}

/// Replace `mark` after the listed bases (or, with `unless`, after any
/// other base).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSubstitution {
    pub mark: char,
    pub replacement: char,
    pub bases: Vec<char>,
    #[serde(default)]
    pub unless: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotlessRule {
    pub base: char,
    pub replacement: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccentRules {
    /// Code points attempted as compositions when not already present.
    pub sweep: (u32, u32),
    pub exceptions: Vec<DecompositionException>,
    pub dotless: Vec<DotlessRule>,
    /// Marks that make `dotless` apply.
    pub dotless_marks: (u32, u32),
    pub substitutions: Vec<MarkSubstitution>,
    /// Bases whose composed glyphs are re-spaced with a compensating pair
    /// adjustment.
    pub respaced_bases: Vec<String>,
    pub widened: Vec<WidenRule>,
    pub placements: Vec<PlacementRule>,
}

/// Widen a composed glyph and push the mark along with a pair adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidenRule {
    pub targets: Vec<String>,
    pub mark: String,
    pub amount: f64,
}

/// Move `second` horizontally when it follows `first`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
    pub first: String,
    pub second: String,
    pub x_placement: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantFeature {
    pub suffix: String,
    pub feature: String,
    /// Contextual alternates: substitute the variant after these glyphs.
    #[serde(default)]
    pub after: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeTables {
    pub carve: Vec<CarveRecipe>,
    pub bases: Vec<BaseRecipe>,
    pub derived_marks: Vec<DerivedMarkRecipe>,
    pub overlay_marks: Vec<OverlayRecipe>,
    pub derived_glyphs: Vec<DerivedGlyph>,
    /// Glyphs that receive top/bottom/corner anchors.
    pub anchored: Vec<String>,
    pub digraphs: Vec<DigraphRecipe>,
    pub accents: AccentRules,
    /// Digraphs built from the results of the accent sweep.
    pub late_digraphs: Vec<DigraphRecipe>,
    pub variants: Vec<VariantFeature>,
    /// Left and right bearings given to carved and derived glyphs.
    pub bearings: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopOverride {
    pub glyph: String,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub dy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalOffset {
    pub glyph: String,
    pub dx: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorTables {
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_overrides: Vec<TopOverride>,
    pub upper_right_offsets: Vec<HorizontalOffset>,
    /// How far inside the extreme the diagonal probe line sits.
    pub probe_depth: f64,
}

/// Letters whose side has each silhouette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeLetters {
    pub vertical_bar: String,
    pub open_bowl: String,
    pub complex: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassMode {
    Any,
    OnlyTightening,
    Touching,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum KerningRule {
    /// Fixed value for every listed pair.
    Pair {
        left: Vec<String>,
        right: Vec<String>,
        value: i32,
    },
    /// Kern every listed pair to a target ink separation.
    Pass {
        separation: f64,
        left: Vec<String>,
        right: Vec<String>,
        #[serde(default)]
        min_kern: f64,
        mode: PassMode,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureOffset {
    pub glyph: String,
    pub dy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KerningTables {
    /// Classifies a glyph's left side by its leading letter.
    pub leading: ShapeLetters,
    /// Classifies a glyph's right side by its trailing letter.
    pub trailing: ShapeLetters,
    /// Rows: trailing class of the left glyph. Columns: no class, then the
    /// leading class of the right glyph.
    pub matrix: [[i32; 4]; 3],
    /// Suffixes marking `Xsuffix` names as accented forms of `X`.
    pub accent_suffixes: Vec<String>,
    /// Suffixes marking `X.suffix` names as variants of `X`.
    pub variant_suffixes: Vec<String>,
    /// Vertical offsets applied while measuring ink separation.
    pub measurement_offsets: Vec<MeasureOffset>,
    /// Row spacing of the ink profiles used for separation.
    pub profile_step: f64,
    pub rules: Vec<KerningRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_exceptions_resolve_per_field() {
        let config = PipelineConfig::default();
        assert_eq!(config.width_pads("one"), 4.0);
        assert_eq!(config.shift_pads("one"), 3.0);
        assert_eq!(config.width_pads("f"), 0.0);
        assert_eq!(config.shift_pads("f"), 0.0);
        assert_eq!(config.width_pads("T_T"), -2.0);
        assert_eq!(config.shift_pads("g"), -3.0);
        assert_eq!(config.width_pads("a"), 2.0);
        assert_eq!(config.shift_pads("a"), 1.0);
    }

    #[test]
    fn tables_survive_a_json_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tables.json");
        let config = PipelineConfig::default();
        config.save(&path).expect("save");
        let loaded = PipelineConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_tables_fill_in_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "space_width": 300.0 }"#).expect("partial tables");
        assert_eq!(config.space_width, 300.0);
        assert_eq!(config.finalize.passes, 2);
    }
}
