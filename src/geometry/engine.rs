//! The outline engine seam

use kurbo::{Cap, Join, Stroke, StrokeOpts};
use std::path::Path;

use super::{boolean, svg, GeometryError, Outline, FLATTEN_TOLERANCE};

/// Operations that need a real geometry backend.
pub trait OutlineEngine: Send + Sync {
    /// Import the outline stored at `path`.
    fn load(&self, path: &Path) -> Result<Outline, GeometryError>;

    /// `a` with `b` cut away.
    fn exclude(&self, a: &Outline, b: &Outline) -> Result<Outline, GeometryError>;

    /// Thicken the ink by a round pen of `width`, keeping the original fill.
    fn stroke_expand(&self, outline: &Outline, width: f64) -> Result<Outline, GeometryError>;
}

/// SVG import with kurbo strokes and i_overlay booleans.
#[derive(Debug, Clone, Copy)]
pub struct KurboEngine {
    pub tolerance: f64,
}

impl Default for KurboEngine {
    fn default() -> Self {
        Self {
            tolerance: FLATTEN_TOLERANCE,
        }
    }
}

impl OutlineEngine for KurboEngine {
    fn load(&self, path: &Path) -> Result<Outline, GeometryError> {
        svg::load_svg(path)
    }

    fn exclude(&self, a: &Outline, b: &Outline) -> Result<Outline, GeometryError> {
        boolean::difference(a, b, self.tolerance)
    }

    fn stroke_expand(&self, outline: &Outline, width: f64) -> Result<Outline, GeometryError> {
        stroke_expand(outline, width, self.tolerance)
    }
}

pub(crate) fn stroke_expand(
    outline: &Outline,
    width: f64,
    tolerance: f64,
) -> Result<Outline, GeometryError> {
    if outline.is_empty() {
        return Err(GeometryError::EmptyOperand {
            operation: "stroke expand",
        });
    }
    let style = Stroke::new(width)
        .with_caps(Cap::Round)
        .with_join(Join::Round);
    let opts = StrokeOpts::default();
    let mut pen = Outline::default();
    for contour in outline.contours() {
        pen.append(Outline::from(kurbo::stroke(
            contour.iter(),
            &style,
            &opts,
            tolerance,
        )));
    }
    let result = boolean::union(outline, &pen, tolerance);
    if result.is_empty() {
        return Err(GeometryError::EmptyResult {
            operation: "stroke expand",
        });
    }
    Ok(result)
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Serves pre-registered outlines instead of reading files.
    #[derive(Debug, Default)]
    pub struct MemoryEngine {
        outlines: HashMap<PathBuf, Outline>,
    }

    impl MemoryEngine {
        pub fn insert(&mut self, path: impl Into<PathBuf>, outline: Outline) {
            self.outlines.insert(path.into(), outline);
        }
    }

    impl OutlineEngine for MemoryEngine {
        fn load(&self, path: &Path) -> Result<Outline, GeometryError> {
            self.outlines
                .get(path)
                .cloned()
                .ok_or_else(|| GeometryError::Unregistered {
                    path: path.to_path_buf(),
                })
        }

        fn exclude(&self, a: &Outline, b: &Outline) -> Result<Outline, GeometryError> {
            boolean::difference(a, b, FLATTEN_TOLERANCE)
        }

        fn stroke_expand(&self, outline: &Outline, width: f64) -> Result<Outline, GeometryError> {
            stroke_expand(outline, width, FLATTEN_TOLERANCE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::BezPath;

    #[test]
    fn stroke_expand_grows_by_half_the_pen() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((100.0, 0.0));
        p.line_to((100.0, 100.0));
        p.line_to((0.0, 100.0));
        p.close_path();
        let thick = KurboEngine::default()
            .stroke_expand(&Outline::new(vec![p]), 10.0)
            .expect("square strokes");
        let bbox = thick.bounding_box().expect("non-empty");
        assert!((bbox.x0 + 5.0).abs() < 0.5, "{bbox:?}");
        assert!((bbox.x1 - 105.0).abs() < 0.5, "{bbox:?}");
    }

    #[test]
    fn stroking_nothing_fails() {
        let err = KurboEngine::default().stroke_expand(&Outline::default(), 10.0);
        assert!(matches!(err, Err(GeometryError::EmptyOperand { .. })));
    }
}
