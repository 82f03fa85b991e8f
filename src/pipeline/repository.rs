//! The glyph repository threaded through every pipeline stage
//!
//! Write access by stage:
//! - Normalize: glyph outlines and advance widths of scanned samples
//! - Compose: new glyphs, their anchors, substitution rules, pair adjustments
//! - Kerning: the kerning table
//!
//! Every stage reads only what earlier stages have finished.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::Outline;

/// Attachment classes. Marks and bases meet on matching classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorClass {
    Top,
    Bottom,
    UpperRight,
    LowerRightEnd,
    /// Mark-to-mark stacking above a top mark.
    Top1,
}

impl AnchorClass {
    /// Classes tried, in order, when attaching a mark to a base.
    pub const ATTACHMENT_ORDER: [AnchorClass; 4] = [
        AnchorClass::Top,
        AnchorClass::Bottom,
        AnchorClass::UpperRight,
        AnchorClass::LowerRightEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::UpperRight => "upperright",
            Self::LowerRightEnd => "lowerrightend",
            Self::Top1 => "top1",
        }
    }
}

/// What side of the attachment an anchor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorRole {
    /// On a base glyph; marks attach here.
    Base,
    /// On a mark; this point lands on the base anchor.
    Mark,
    /// On a mark; a further mark stacks here.
    BaseMark,
}

pub type AnchorKey = (AnchorClass, AnchorRole);

/// How a glyph came to exist. Used for substitution wiring and kerning
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlyphOrigin {
    Sample { line: i32 },
    Ligature { components: Vec<String> },
    Variant { base: String, suffix: String },
    Digraph { first: String, second: String },
    Accent { base: String, mark: String },
    Carved { source: String },
    Derived { sources: Vec<String> },
    Space,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub name: String,
    /// Empty for unencoded glyphs such as ligatures and variants.
    pub codepoints: Vec<char>,
    pub outline: Outline,
    pub advance_width: f64,
    pub anchors: BTreeMap<AnchorKey, Point>,
    pub origin: GlyphOrigin,
    /// The sample file or recipe this glyph was built from.
    pub provenance: String,
}

impl Glyph {
    pub fn new(name: impl Into<String>, outline: Outline, advance_width: f64, origin: GlyphOrigin) -> Self {
        Self {
            name: name.into(),
            codepoints: Vec::new(),
            outline,
            advance_width,
            anchors: BTreeMap::new(),
            origin,
            provenance: String::new(),
        }
    }

    pub fn with_codepoints(mut self, codepoints: Vec<char>) -> Self {
        self.codepoints = codepoints;
        self
    }

    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        self.outline.bounding_box()
    }

    pub fn left_bearing(&self) -> f64 {
        self.bounding_box().map_or(0.0, |b| b.x0)
    }

    pub fn right_bearing(&self) -> f64 {
        self.bounding_box()
            .map_or(self.advance_width, |b| self.advance_width - b.x1)
    }

    /// Move the ink so it starts `left` from the origin and make the advance
    /// end `right` past the ink. Anchors move with the ink.
    pub fn set_bearings(&mut self, left: f64, right: f64) {
        let Some(bbox) = self.bounding_box() else {
            return;
        };
        self.translate(Vec2::new(left - bbox.x0, 0.0));
        self.advance_width = left + bbox.width() + right;
    }

    /// Translate the outline together with its anchors.
    pub fn translate(&mut self, offset: Vec2) {
        self.outline.translate(offset.x, offset.y);
        for point in self.anchors.values_mut() {
            *point += offset;
        }
    }

    pub fn anchor(&self, class: AnchorClass, role: AnchorRole) -> Option<Point> {
        self.anchors.get(&(class, role)).copied()
    }

    /// Anchors live on the integer grid, like the outline points.
    pub fn set_anchor(&mut self, class: AnchorClass, role: AnchorRole, point: Point) {
        self.anchors.insert((class, role), point.round());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionKind {
    Ligature,
    ContextualVariant,
}

/// `trigger` becomes `result` under `feature`, optionally only after
/// `backtrack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionRule {
    pub trigger: Vec<String>,
    pub result: String,
    pub kind: SubstitutionKind,
    pub feature: String,
    pub backtrack: Vec<String>,
}

impl SubstitutionRule {
    pub fn ligature(components: Vec<String>, result: &str) -> Self {
        Self {
            trigger: components,
            result: result.to_string(),
            kind: SubstitutionKind::Ligature,
            feature: "liga".to_string(),
            backtrack: Vec::new(),
        }
    }

    pub fn variant(base: &str, result: &str, feature: &str, backtrack: Vec<String>) -> Self {
        Self {
            trigger: vec![base.to_string()],
            result: result.to_string(),
            kind: SubstitutionKind::ContextualVariant,
            feature: feature.to_string(),
            backtrack,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValueRecord {
    pub x_placement: i32,
    pub x_advance: i32,
}

impl ValueRecord {
    pub fn is_zero(&self) -> bool {
        self.x_placement == 0 && self.x_advance == 0
    }
}

/// Positioning of a glyph pair outside the kerning table (side accents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairAdjustment {
    pub first: String,
    pub second: String,
    pub first_value: ValueRecord,
    pub second_value: ValueRecord,
}

/// Silhouette of one side of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ShapeClass {
    VerticalBar,
    OpenBowl,
    Complex,
}

impl ShapeClass {
    pub const ALL: [ShapeClass; 3] = [Self::VerticalBar, Self::OpenBowl, Self::Complex];

    pub fn index(&self) -> usize {
        match self {
            Self::VerticalBar => 0,
            Self::OpenBowl => 1,
            Self::Complex => 2,
        }
    }

    pub fn group_suffix(&self) -> &'static str {
        match self {
            Self::VerticalBar => "vbar",
            Self::OpenBowl => "bowl",
            Self::Complex => "complex",
        }
    }
}

/// Class matrix plus sparse pair overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KerningTable {
    /// Left-side glyphs grouped by the silhouette of their right edge.
    pub left_groups: [BTreeSet<String>; 3],
    /// Right-side glyphs grouped by the silhouette of their left edge.
    pub right_groups: [BTreeSet<String>; 3],
    /// Rows: left group. Column 0: right glyph in no group.
    pub matrix: [[i32; 4]; 3],
    pub pairs: BTreeMap<(String, String), i32>,
}

impl KerningTable {
    pub fn left_class(&self, glyph: &str) -> Option<ShapeClass> {
        ShapeClass::ALL
            .into_iter()
            .find(|class| self.left_groups[class.index()].contains(glyph))
    }

    pub fn right_class(&self, glyph: &str) -> Option<ShapeClass> {
        ShapeClass::ALL
            .into_iter()
            .find(|class| self.right_groups[class.index()].contains(glyph))
    }

    pub fn class_value(&self, left: &str, right: &str) -> i32 {
        let Some(row) = self.left_class(left) else {
            return 0;
        };
        let column = self.right_class(right).map_or(0, |c| c.index() + 1);
        self.matrix[row.index()][column]
    }

    /// Kerning for a pair. An explicit pair always wins over the matrix.
    pub fn lookup(&self, left: &str, right: &str) -> i32 {
        self.pairs
            .get(&(left.to_string(), right.to_string()))
            .copied()
            .unwrap_or_else(|| self.class_value(left, right))
    }

    pub fn set_pair(&mut self, left: &str, right: &str, value: i32) {
        self.pairs.insert((left.to_string(), right.to_string()), value);
    }
}

/// Owned store of every glyph and the tables built over them.
#[derive(Debug, Clone, Default)]
pub struct GlyphRepository {
    glyphs: BTreeMap<String, Glyph>,
    pub substitutions: Vec<SubstitutionRule>,
    pub pair_adjustments: Vec<PairAdjustment>,
    pub kerning: KerningTable,
}

impl GlyphRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the glyph with the same name.
    pub fn insert(&mut self, glyph: Glyph) -> Option<Glyph> {
        self.glyphs.insert(glyph.name.clone(), glyph)
    }

    pub fn get(&self, name: &str) -> Option<&Glyph> {
        self.glyphs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Glyph> {
        self.glyphs.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.glyphs.contains_key(name)
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.glyphs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Name of the glyph encoding `c`, if any.
    pub fn glyph_for_char(&self, c: char) -> Option<&Glyph> {
        self.glyphs.values().find(|g| g.codepoints.contains(&c))
    }

    pub fn add_pair_adjustment(&mut self, adjustment: PairAdjustment) {
        if let Some(existing) = self
            .pair_adjustments
            .iter_mut()
            .find(|p| p.first == adjustment.first && p.second == adjustment.second)
        {
            *existing = adjustment;
        } else {
            self.pair_adjustments.push(adjustment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::BezPath;

    fn square(x0: f64, y0: f64, size: f64) -> Outline {
        let mut p = BezPath::new();
        p.move_to((x0, y0));
        p.line_to((x0 + size, y0));
        p.line_to((x0 + size, y0 + size));
        p.line_to((x0, y0 + size));
        p.close_path();
        Outline::new(vec![p])
    }

    #[test]
    fn bearings_move_ink_and_anchors() {
        let mut glyph = Glyph::new("o", square(100.0, 0.0, 200.0), 500.0, GlyphOrigin::Space);
        glyph.set_anchor(AnchorClass::Top, AnchorRole::Base, Point::new(200.0, 200.0));
        glyph.set_bearings(20.0, 40.0);
        assert_eq!(glyph.left_bearing(), 20.0);
        assert_eq!(glyph.right_bearing(), 40.0);
        assert_eq!(glyph.advance_width, 260.0);
        assert_eq!(
            glyph.anchor(AnchorClass::Top, AnchorRole::Base),
            Some(Point::new(120.0, 200.0))
        );
    }

    #[test]
    fn anchors_are_snapped() {
        let mut glyph = Glyph::new("a", Outline::default(), 0.0, GlyphOrigin::Space);
        glyph.set_anchor(AnchorClass::Top, AnchorRole::Mark, Point::new(10.4, 20.6));
        assert_eq!(
            glyph.anchor(AnchorClass::Top, AnchorRole::Mark),
            Some(Point::new(10.0, 21.0))
        );
    }

    #[test]
    fn pair_override_beats_class_value() {
        let mut table = KerningTable {
            matrix: [[0, 0, -20, -30], [0, -20, -25, -30], [0, -30, -30, -30]],
            ..KerningTable::default()
        };
        table.left_groups[ShapeClass::Complex.index()].insert("T".into());
        table.right_groups[ShapeClass::OpenBowl.index()].insert("o".into());
        assert_eq!(table.lookup("T", "o"), -30);
        table.set_pair("T", "o", -90);
        assert_eq!(table.lookup("T", "o"), -90);
        assert_eq!(table.lookup("x", "o"), 0);
    }

    #[test]
    fn pair_adjustments_replace_same_pair() {
        let mut repo = GlyphRepository::new();
        let adjustment = |x_advance| PairAdjustment {
            first: "dotlessi".into(),
            second: "gravecomb".into(),
            first_value: ValueRecord {
                x_placement: 0,
                x_advance,
            },
            second_value: ValueRecord::default(),
        };
        repo.add_pair_adjustment(adjustment(10));
        repo.add_pair_adjustment(adjustment(20));
        assert_eq!(repo.pair_adjustments.len(), 1);
        assert_eq!(repo.pair_adjustments[0].first_value.x_advance, 20);
    }
}
