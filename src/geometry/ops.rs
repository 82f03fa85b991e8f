//! Declarative outline edits used by the policy tables

use serde::{Deserialize, Serialize};

use super::{GeometryError, Outline, OutlineEngine};

/// One step of an outline edit. Lists of these describe the special-case
/// transforms and the recipes that derive glyphs from other glyphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OutlineOp {
    Translate { dx: f64, dy: f64 },
    /// Scale about the origin.
    Scale { sx: f64, sy: f64 },
    /// Rotate about the bounding-box centre.
    Rotate { degrees: f64 },
    /// Rotate about the origin and lift onto the baseline.
    RotateOntoBaseline { degrees: f64 },
    /// Stroke-expand to thicken the ink; the glyph keeps its bottom-left
    /// corner and its advance grows by half the stroke width.
    Weight { width: f64 },
}

impl OutlineOp {
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self::Translate { dx, dy }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::Scale { sx, sy }
    }

    pub fn rotate(degrees: f64) -> Self {
        Self::Rotate { degrees }
    }

    /// Apply to an outline and the advance width that goes with it.
    pub fn apply(
        &self,
        outline: &mut Outline,
        advance: &mut f64,
        engine: &dyn OutlineEngine,
    ) -> Result<(), GeometryError> {
        match *self {
            Self::Translate { dx, dy } => outline.translate(dx, dy),
            Self::Scale { sx, sy } => outline.scale(sx, sy),
            Self::Rotate { degrees } => outline.rotate_about_center(degrees),
            Self::RotateOntoBaseline { degrees } => outline.rotate_onto_baseline(degrees),
            Self::Weight { width } => {
                outline.simplify(1.0);
                *outline = engine.stroke_expand(outline, width)?;
                outline.translate(width / 2.0, width / 2.0);
                *advance += width / 2.0;
            }
        }
        Ok(())
    }
}

/// Apply a list of ops in order.
pub fn apply_all(
    ops: &[OutlineOp],
    outline: &mut Outline,
    advance: &mut f64,
    engine: &dyn OutlineEngine,
) -> Result<(), GeometryError> {
    ops.iter()
        .try_for_each(|op| op.apply(outline, advance, engine))
}
