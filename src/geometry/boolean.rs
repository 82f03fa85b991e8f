//! Boolean operations on flattened outlines, backed by i_overlay

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use kurbo::{BezPath, PathEl};

use super::{GeometryError, Outline};

type Polygon = Vec<[f64; 2]>;

/// Flatten every contour into a closed polygon.
pub fn to_polygons(outline: &Outline, tolerance: f64) -> Vec<Polygon> {
    let mut polygons = Vec::new();
    for contour in outline.contours() {
        let mut current: Polygon = Vec::new();
        kurbo::flatten(contour.iter(), tolerance, |el| match el {
            PathEl::MoveTo(p) => {
                if current.len() >= 3 {
                    polygons.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push([p.x, p.y]);
            }
            PathEl::LineTo(p) => {
                if current.last() != Some(&[p.x, p.y]) {
                    current.push([p.x, p.y]);
                }
            }
            PathEl::ClosePath => {
                if current.len() > 1 && current.first() == current.last() {
                    current.pop();
                }
                if current.len() >= 3 {
                    polygons.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            _ => {}
        });
        if current.len() >= 3 {
            polygons.push(current);
        }
    }
    polygons
}

fn from_shapes(shapes: Vec<Vec<Polygon>>) -> Outline {
    let contours = shapes
        .into_iter()
        .flatten()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| {
            let mut path = BezPath::new();
            path.move_to((ring[0][0], ring[0][1]));
            for [x, y] in &ring[1..] {
                path.line_to((*x, *y));
            }
            path.close_path();
            path
        })
        .collect();
    Outline::new(contours)
}

/// `a` minus `b`.
pub fn difference(a: &Outline, b: &Outline, tolerance: f64) -> Result<Outline, GeometryError> {
    if a.is_empty() {
        return Err(GeometryError::EmptyOperand {
            operation: "exclude",
        });
    }
    let subject = to_polygons(a, tolerance);
    let clip = to_polygons(b, tolerance);
    if clip.is_empty() {
        return Ok(from_shapes(vec![subject]));
    }
    let shapes = subject.overlay(&clip, OverlayRule::Difference, FillRule::EvenOdd);
    let result = from_shapes(shapes);
    if result.is_empty() {
        return Err(GeometryError::EmptyResult {
            operation: "exclude",
        });
    }
    Ok(result)
}

/// Union of two outlines under the non-zero rule, which also merges
/// overlapping contours within each operand.
pub fn union(a: &Outline, b: &Outline, tolerance: f64) -> Outline {
    let subject = to_polygons(a, tolerance);
    let clip = to_polygons(b, tolerance);
    from_shapes(subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero))
}
